//! # Management Endpoint Traits
//!
//! The interfaces the lifecycle core needs from its external collaborators.
//! Adapters for a concrete management endpoint implement these; session
//! establishment and object lookup mechanics stay on the adapter side.

use async_trait::async_trait;

use super::errors::RemoteResult;
use crate::models::{
    ClusterCandidate, HostCandidate, OperationHandle, ReplicaRef, WorkloadRef,
};
use crate::state_machine::{OperationState, PowerState, ProtectionState};

/// Directory service over the inventory
#[async_trait]
pub trait InventoryDirectory: Send + Sync {
    /// Every cluster resource in the inventory, in enumeration order
    async fn list_clusters(&self) -> RemoteResult<Vec<ClusterCandidate>>;

    /// Member hosts of a cluster, in enumeration order
    async fn list_members(&self, cluster: &ClusterCandidate) -> RemoteResult<Vec<HostCandidate>>;

    /// Workloads registered on a host, in enumeration order
    async fn list_workloads(&self, host: &HostCandidate) -> RemoteResult<Vec<WorkloadRef>>;

    /// Look a cluster up by name
    ///
    /// Default implementation scans `list_clusters` and returns the first match.
    async fn find_cluster(&self, name: &str) -> RemoteResult<Option<ClusterCandidate>> {
        let clusters = self.list_clusters().await?;
        Ok(clusters.into_iter().find(|cluster| cluster.name == name))
    }
}

/// Mutations and state queries on a workload
///
/// Every mutation answers with the handle of a long-running operation. `Ok(None)`
/// means the endpoint accepted the call without returning a trackable handle.
#[async_trait]
pub trait WorkloadApi: Send + Sync {
    async fn create_replica(
        &self,
        workload: &WorkloadRef,
        target_host: &HostCandidate,
    ) -> RemoteResult<Option<OperationHandle>>;

    async fn power_on(&self, workload: &WorkloadRef) -> RemoteResult<Option<OperationHandle>>;

    async fn power_off(&self, workload: &WorkloadRef) -> RemoteResult<Option<OperationHandle>>;

    async fn disable_replica(
        &self,
        workload: &WorkloadRef,
        replica: &ReplicaRef,
    ) -> RemoteResult<Option<OperationHandle>>;

    async fn enable_replica(
        &self,
        workload: &WorkloadRef,
        replica: &ReplicaRef,
        target_host: &HostCandidate,
    ) -> RemoteResult<Option<OperationHandle>>;

    async fn promote_replica(
        &self,
        workload: &WorkloadRef,
        replica: &ReplicaRef,
    ) -> RemoteResult<Option<OperationHandle>>;

    async fn remove_protection(
        &self,
        workload: &WorkloadRef,
    ) -> RemoteResult<Option<OperationHandle>>;

    async fn protection_state(&self, workload: &WorkloadRef) -> RemoteResult<ProtectionState>;

    async fn power_state(&self, workload: &WorkloadRef) -> RemoteResult<PowerState>;
}

/// State queries on long-running operations
#[async_trait]
pub trait OperationApi: Send + Sync {
    async fn operation_state(&self, handle: &OperationHandle) -> RemoteResult<OperationState>;
}

/// A full management session: directory, workload control and operation tracking
///
/// Blanket-implemented for anything providing the three collaborator traits.
pub trait ManagementClient: InventoryDirectory + WorkloadApi + OperationApi {}

impl<T> ManagementClient for T where T: InventoryDirectory + WorkloadApi + OperationApi {}
