//! # Inventory Models
//!
//! In-memory views of the remote inventory objects one lifecycle run works with.
//! Nothing here is persisted: values are built during topology resolution and
//! dropped when the run ends.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state_machine::{ConnectionState, PowerState, ProtectionState};

/// A cluster resource as seen by the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterCandidate {
    pub id: String,
    pub name: String,
    /// Whether the cluster's availability (HA) feature is turned on
    pub protection_enabled: bool,
}

/// A compute host belonging to a cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCandidate {
    pub id: String,
    pub name: String,
    pub connection_state: ConnectionState,
}

impl HostCandidate {
    pub fn is_connected(&self) -> bool {
        self.connection_state.is_connected()
    }
}

/// The primary workload under protection
///
/// `protection_state` and `power_state` hold the last values observed through the
/// endpoint; the orchestrator refreshes them as it polls and never asserts them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadRef {
    pub id: String,
    pub name: String,
    pub host_id: String,
    pub protection_state: ProtectionState,
    pub power_state: PowerState,
}

impl WorkloadRef {
    pub fn observe_protection(&mut self, state: ProtectionState) {
        self.protection_state = state;
    }

    pub fn observe_power(&mut self, state: PowerState) {
        self.power_state = state;
    }

    pub fn is_hosted_on(&self, host: &HostCandidate) -> bool {
        self.host_id == host.id
    }
}

/// The secondary instance created when protection is turned on
///
/// Shares the primary's name and lives on the secondary host. It is found by
/// scanning that host's workloads, never returned by the enable step itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaRef {
    pub id: String,
    pub name: String,
    pub host_id: String,
}

impl From<&WorkloadRef> for ReplicaRef {
    fn from(workload: &WorkloadRef) -> Self {
        Self {
            id: workload.id.clone(),
            name: workload.name.clone(),
            host_id: workload.host_id.clone(),
        }
    }
}

/// Kind of remote long-running operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CreateReplica,
    PowerOn,
    PowerOff,
    DisableReplica,
    EnableReplica,
    PromoteReplica,
    RemoveProtection,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateReplica => "create_replica",
            Self::PowerOn => "power_on",
            Self::PowerOff => "power_off",
            Self::DisableReplica => "disable_replica",
            Self::EnableReplica => "enable_replica",
            Self::PromoteReplica => "promote_replica",
            Self::RemoveProtection => "remove_protection",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle to a remote long-running operation
///
/// Owned by the step that issued it and dropped once the task monitor resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationHandle {
    pub id: String,
    pub kind: OperationKind,
}

impl OperationHandle {
    pub fn new(id: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Validated placement produced by topology resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub cluster: ClusterCandidate,
    /// Connected member hosts in enumeration order, at least two
    pub eligible_hosts: Vec<HostCandidate>,
    pub primary_host: HostCandidate,
    pub workload: WorkloadRef,
    pub secondary_host: HostCandidate,
}
