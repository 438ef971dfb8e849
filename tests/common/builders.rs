//! Inventory builders and runner helpers shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use ft_lifecycle::client::{
    ClusterSnapshot, HostSnapshot, InventorySnapshot, SimulatedEndpoint, WorkloadSnapshot,
};
use ft_lifecycle::config::{LifecyclePolicy, TimeoutConfig};
use ft_lifecycle::orchestration::LifecycleRunner;
use ft_lifecycle::state_machine::ConnectionState;

pub const CLUSTER: &str = "TestCluster";

/// Builder pattern for test inventories: one cluster, hosts in insertion order
pub struct InventoryBuilder {
    cluster: ClusterSnapshot,
}

impl InventoryBuilder {
    pub fn new() -> Self {
        Self::named(CLUSTER)
    }

    pub fn named(name: &str) -> Self {
        Self {
            cluster: ClusterSnapshot {
                name: name.to_string(),
                protection_enabled: true,
                hosts: Vec::new(),
            },
        }
    }

    pub fn protection_enabled(mut self, enabled: bool) -> Self {
        self.cluster.protection_enabled = enabled;
        self
    }

    pub fn with_host(self, name: &str, workloads: &[&str]) -> Self {
        self.with_host_in_state(name, ConnectionState::Connected, workloads)
    }

    pub fn with_host_in_state(
        mut self,
        name: &str,
        connection_state: ConnectionState,
        workloads: &[&str],
    ) -> Self {
        self.cluster.hosts.push(HostSnapshot {
            name: name.to_string(),
            connection_state,
            workloads: workloads.iter().map(|w| WorkloadSnapshot::new(*w)).collect(),
        });
        self
    }

    pub fn with_workload(mut self, host: &str, workload: WorkloadSnapshot) -> Self {
        if let Some(snapshot) = self.cluster.hosts.iter_mut().find(|h| h.name == host) {
            snapshot.workloads.push(workload);
        }
        self
    }

    pub fn snapshot(self) -> InventorySnapshot {
        InventorySnapshot {
            clusters: vec![self.cluster],
        }
    }

    pub fn endpoint(self) -> Arc<SimulatedEndpoint> {
        Arc::new(SimulatedEndpoint::from_snapshot(&self.snapshot()))
    }
}

impl Default for InventoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Two connected hosts, one workload on the first
pub fn two_host_endpoint() -> Arc<SimulatedEndpoint> {
    InventoryBuilder::new()
        .with_host("esx-a", &["app-01"])
        .with_host("esx-b", &[])
        .endpoint()
}

/// Timeouts with every sleep removed; budgets stay the production ones
pub fn fast_timeouts() -> TimeoutConfig {
    TimeoutConfig::default().without_delays()
}

pub fn runner_for(endpoint: &Arc<SimulatedEndpoint>) -> LifecycleRunner<SimulatedEndpoint> {
    runner_with_policy(endpoint, LifecyclePolicy::default())
}

pub fn runner_with_policy(
    endpoint: &Arc<SimulatedEndpoint>,
    policy: LifecyclePolicy,
) -> LifecycleRunner<SimulatedEndpoint> {
    LifecycleRunner::new(endpoint.clone(), fast_timeouts(), policy)
}
