//! # Models
//!
//! Inventory objects and operation handles shared by the resolver, the
//! orchestrator and the rollback guard.

pub mod inventory;

pub use inventory::{
    ClusterCandidate, HostCandidate, OperationHandle, OperationKind, ReplicaRef, Topology,
    WorkloadRef,
};
