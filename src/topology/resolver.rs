use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::{InventoryDirectory, RemoteError};
use crate::constants::system::MIN_CONNECTED_HOSTS;
use crate::models::{ClusterCandidate, HostCandidate, Topology, WorkloadRef};

/// Precondition failures detected before any mutation is attempted
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionError {
    #[error("Cluster not found in inventory: {cluster}")]
    ClusterNotFound { cluster: String },

    #[error("Fault tolerance requires the availability feature to be enabled on cluster {cluster}")]
    ProtectionNotEnabled { cluster: String },

    #[error("Cluster {cluster} has {connected} connected host(s), at least {required} are required")]
    InsufficientHosts {
        cluster: String,
        connected: usize,
        required: usize,
    },

    #[error("Workload {workload} not found on any connected host of cluster {cluster}")]
    WorkloadNotFound { workload: String, cluster: String },

    #[error("No workload available on any connected host of cluster {cluster}")]
    NoWorkloadAvailable { cluster: String },

    #[error("Directory lookup failed: {0}")]
    Remote(#[from] RemoteError),
}

pub struct TopologyResolver<D: ?Sized> {
    directory: Arc<D>,
}

impl<D: InventoryDirectory + ?Sized> TopologyResolver<D> {
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    /// Resolve the placement for one lifecycle run
    ///
    /// Checks are ordered so that each failure is reported before later ones are
    /// evaluated: the protection flag is rejected before member hosts are counted.
    /// Read-only: repeated calls over an unchanged inventory give the same result.
    pub async fn resolve(
        &self,
        cluster_name: &str,
        workload_name: Option<&str>,
    ) -> Result<Topology, ResolutionError> {
        let cluster = self.find_cluster(cluster_name).await?;

        if !cluster.protection_enabled {
            warn!(cluster = %cluster.name, "⚠️ TOPOLOGY: availability feature is disabled on cluster");
            return Err(ResolutionError::ProtectionNotEnabled {
                cluster: cluster.name,
            });
        }

        let eligible_hosts = self.connected_hosts(&cluster).await?;
        let (workload, primary_host) = match workload_name {
            Some(name) => self.find_named_workload(&cluster, &eligible_hosts, name).await?,
            None => self.first_workload(&cluster, &eligible_hosts).await?,
        };

        // At least two eligible hosts exist, so a host other than the primary is always found
        let secondary_host = eligible_hosts
            .iter()
            .find(|host| host.id != primary_host.id)
            .cloned()
            .ok_or_else(|| ResolutionError::InsufficientHosts {
                cluster: cluster.name.clone(),
                connected: eligible_hosts.len(),
                required: MIN_CONNECTED_HOSTS,
            })?;

        info!(
            cluster = %cluster.name,
            workload = %workload.name,
            primary_host = %primary_host.name,
            secondary_host = %secondary_host.name,
            eligible_hosts = eligible_hosts.len(),
            "✅ TOPOLOGY: placement resolved"
        );

        Ok(Topology {
            cluster,
            eligible_hosts,
            primary_host,
            workload,
            secondary_host,
        })
    }

    async fn find_cluster(&self, cluster_name: &str) -> Result<ClusterCandidate, ResolutionError> {
        self.directory
            .find_cluster(cluster_name)
            .await?
            .ok_or_else(|| {
                warn!(cluster = %cluster_name, "⚠️ TOPOLOGY: cluster not found in inventory");
                ResolutionError::ClusterNotFound {
                    cluster: cluster_name.to_string(),
                }
            })
    }

    async fn connected_hosts(
        &self,
        cluster: &ClusterCandidate,
    ) -> Result<Vec<HostCandidate>, ResolutionError> {
        let members = self.directory.list_members(cluster).await?;
        let total = members.len();
        let connected: Vec<HostCandidate> = members
            .into_iter()
            .filter(HostCandidate::is_connected)
            .collect();

        debug!(
            cluster = %cluster.name,
            members = total,
            connected = connected.len(),
            "TOPOLOGY: member hosts enumerated"
        );

        if connected.len() < MIN_CONNECTED_HOSTS {
            warn!(
                cluster = %cluster.name,
                connected = connected.len(),
                "⚠️ TOPOLOGY: fault tolerance needs a primary and a secondary host"
            );
            return Err(ResolutionError::InsufficientHosts {
                cluster: cluster.name.clone(),
                connected: connected.len(),
                required: MIN_CONNECTED_HOSTS,
            });
        }

        Ok(connected)
    }

    async fn find_named_workload(
        &self,
        cluster: &ClusterCandidate,
        hosts: &[HostCandidate],
        workload_name: &str,
    ) -> Result<(WorkloadRef, HostCandidate), ResolutionError> {
        for host in hosts {
            let workloads = self.directory.list_workloads(host).await?;
            if let Some(workload) = workloads.into_iter().find(|w| w.name == workload_name) {
                return Ok((workload, host.clone()));
            }
        }

        warn!(workload = %workload_name, cluster = %cluster.name, "⚠️ TOPOLOGY: workload not found");
        Err(ResolutionError::WorkloadNotFound {
            workload: workload_name.to_string(),
            cluster: cluster.name.clone(),
        })
    }

    async fn first_workload(
        &self,
        cluster: &ClusterCandidate,
        hosts: &[HostCandidate],
    ) -> Result<(WorkloadRef, HostCandidate), ResolutionError> {
        for host in hosts {
            let workloads = self.directory.list_workloads(host).await?;
            if let Some(workload) = workloads.into_iter().next() {
                debug!(workload = %workload.name, host = %host.name, "TOPOLOGY: no workload named, picked the first one found");
                return Ok((workload, host.clone()));
            }
        }

        warn!(cluster = %cluster.name, "⚠️ TOPOLOGY: no workload available");
        Err(ResolutionError::NoWorkloadAvailable {
            cluster: cluster.name.clone(),
        })
    }
}
