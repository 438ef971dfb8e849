//! # Simulated Management Endpoint
//!
//! In-memory implementation of every collaborator trait, driven by an
//! [`InventorySnapshot`]. Used for offline rehearsals from the launcher and as
//! the test double of the lifecycle core.
//!
//! Issued operations follow a per-kind script of observed states (default
//! `[Running, Success]`, last state sticks). The first time a handle is observed
//! as `Success` the operation's effect is applied to the inventory, so a
//! snapshot rehearses the whole lifecycle without any scripting.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use super::errors::{RemoteError, RemoteResult};
use super::traits::{InventoryDirectory, OperationApi, WorkloadApi};
use crate::error::{LifecycleError, Result};
use crate::models::{
    ClusterCandidate, HostCandidate, OperationHandle, OperationKind, ReplicaRef, WorkloadRef,
};
use crate::state_machine::{ConnectionState, OperationState, PowerState, ProtectionState};

/// Serializable description of an inventory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub clusters: Vec<ClusterSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    pub name: String,
    #[serde(default)]
    pub protection_enabled: bool,
    #[serde(default)]
    pub hosts: Vec<HostSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub name: String,
    #[serde(default)]
    pub connection_state: ConnectionState,
    #[serde(default)]
    pub workloads: Vec<WorkloadSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadSnapshot {
    pub name: String,
    #[serde(default)]
    pub power_state: PowerState,
    #[serde(default)]
    pub protection_state: ProtectionState,
}

impl WorkloadSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            power_state: PowerState::PoweredOff,
            protection_state: ProtectionState::Disabled,
        }
    }
}

/// Call site where a fault can be injected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    ListClusters,
    ListMembers,
    ListWorkloads,
    Issue(OperationKind),
    OperationState,
    ProtectionState,
    PowerState,
}

/// One remote call received by the endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub method: &'static str,
    pub subject: String,
    /// Set for calls that issue a long-running operation
    pub operation: Option<OperationKind>,
}

#[derive(Debug)]
struct SimCluster {
    id: String,
    name: String,
    protection_enabled: bool,
    host_ids: Vec<String>,
}

#[derive(Debug)]
struct SimHost {
    id: String,
    name: String,
    connection_state: ConnectionState,
    workload_ids: Vec<String>,
}

#[derive(Debug)]
struct SimWorkload {
    id: String,
    name: String,
    host_id: String,
    power_state: PowerState,
    protection_state: ProtectionState,
    /// Value the protection state moves to after its next observation
    pending_protection: Option<ProtectionState>,
    scripted_protection: VecDeque<ProtectionState>,
    replica_id: Option<String>,
}

impl SimWorkload {
    fn to_workload_ref(&self) -> WorkloadRef {
        WorkloadRef {
            id: self.id.clone(),
            name: self.name.clone(),
            host_id: self.host_id.clone(),
            protection_state: self.protection_state,
            power_state: self.power_state,
        }
    }
}

#[derive(Debug)]
struct SimOperation {
    kind: OperationKind,
    workload_id: String,
    target_host_id: Option<String>,
    script: VecDeque<OperationState>,
    applied: bool,
}

#[derive(Debug, Default)]
struct SimState {
    clusters: Vec<SimCluster>,
    hosts: HashMap<String, SimHost>,
    workloads: HashMap<String, SimWorkload>,
    operations: HashMap<String, SimOperation>,
    scripts: HashMap<OperationKind, Vec<OperationState>>,
    faults: HashSet<FaultPoint>,
    withheld: HashSet<OperationKind>,
    /// Host replicas are registered on regardless of the requested target
    replica_host: Option<String>,
    calls: Vec<CallRecord>,
    /// Protection states handed out, keyed by workload name
    protection_log: Vec<(String, ProtectionState)>,
    next_id: u64,
}

impl SimState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn record(&mut self, method: &'static str, subject: &str, operation: Option<OperationKind>) {
        self.calls.push(CallRecord {
            method,
            subject: subject.to_string(),
            operation,
        });
    }

    fn check_fault(&self, point: FaultPoint) -> RemoteResult<()> {
        if self.faults.contains(&point) {
            return Err(RemoteError::communication(format!(
                "injected fault at {point:?}"
            )));
        }
        Ok(())
    }

    fn workload_mut(&mut self, id: &str) -> RemoteResult<&mut SimWorkload> {
        self.workloads
            .get_mut(id)
            .ok_or_else(|| RemoteError::not_found("Workload", id))
    }

    fn add_workload(&mut self, host_id: &str, snapshot: &WorkloadSnapshot) -> String {
        let id = self.next_id("vm");
        self.workloads.insert(
            id.clone(),
            SimWorkload {
                id: id.clone(),
                name: snapshot.name.clone(),
                host_id: host_id.to_string(),
                power_state: snapshot.power_state,
                protection_state: snapshot.protection_state,
                pending_protection: None,
                scripted_protection: VecDeque::new(),
                replica_id: None,
            },
        );
        if let Some(host) = self.hosts.get_mut(host_id) {
            host.workload_ids.push(id.clone());
        }
        id
    }

    fn remove_workload(&mut self, id: &str) {
        if let Some(workload) = self.workloads.remove(id) {
            if let Some(host) = self.hosts.get_mut(&workload.host_id) {
                host.workload_ids.retain(|w| w != id);
            }
        }
    }

    fn issue(
        &mut self,
        kind: OperationKind,
        workload: &WorkloadRef,
        target_host_id: Option<&str>,
    ) -> RemoteResult<Option<OperationHandle>> {
        self.record("issue", &workload.name, Some(kind));
        self.check_fault(FaultPoint::Issue(kind))?;
        if !self.workloads.contains_key(&workload.id) {
            return Err(RemoteError::not_found("Workload", &workload.name));
        }
        if self.withheld.contains(&kind) {
            return Ok(None);
        }

        let script = self
            .scripts
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| vec![OperationState::Running, OperationState::Success]);
        let handle = OperationHandle::new(format!("task-{}", Uuid::new_v4()), kind);
        self.operations.insert(
            handle.id.clone(),
            SimOperation {
                kind,
                workload_id: workload.id.clone(),
                target_host_id: target_host_id.map(str::to_string),
                script: script.into(),
                applied: false,
            },
        );
        debug!(handle = %handle, workload = %workload.name, "🧪 SIMULATOR: operation issued");
        Ok(Some(handle))
    }

    fn apply_effect(
        &mut self,
        kind: OperationKind,
        workload_id: &str,
        target_host_id: Option<&str>,
    ) -> RemoteResult<()> {
        match kind {
            OperationKind::CreateReplica => {
                let name = {
                    let workload = self.workload_mut(workload_id)?;
                    workload.protection_state = ProtectionState::Enabled;
                    workload.name.clone()
                };
                let host_id = self
                    .replica_host
                    .clone()
                    .or_else(|| target_host_id.map(str::to_string));
                if let Some(host_id) = host_id {
                    let replica_id = self.add_workload(&host_id, &WorkloadSnapshot::new(name));
                    self.workload_mut(workload_id)?.replica_id = Some(replica_id);
                }
            }
            OperationKind::PowerOn => {
                let workload = self.workload_mut(workload_id)?;
                workload.power_state = PowerState::PoweredOn;
                if workload.protection_state == ProtectionState::Enabled {
                    workload.protection_state = ProtectionState::Starting;
                    workload.pending_protection = Some(ProtectionState::Running);
                }
            }
            OperationKind::PowerOff => {
                let workload = self.workload_mut(workload_id)?;
                workload.power_state = PowerState::PoweredOff;
                workload.pending_protection = None;
                if workload.protection_state != ProtectionState::Disabled {
                    workload.protection_state = ProtectionState::Enabled;
                }
            }
            OperationKind::DisableReplica => {
                let workload = self.workload_mut(workload_id)?;
                workload.protection_state = ProtectionState::Enabled;
                workload.pending_protection = None;
            }
            OperationKind::EnableReplica => {
                let workload = self.workload_mut(workload_id)?;
                if workload.power_state.is_powered_on() {
                    workload.protection_state = ProtectionState::Starting;
                    workload.pending_protection = Some(ProtectionState::Running);
                } else {
                    workload.protection_state = ProtectionState::Enabled;
                }
            }
            OperationKind::PromoteReplica => {
                let workload = self.workload_mut(workload_id)?;
                workload.power_state = PowerState::PoweredOff;
                workload.protection_state = ProtectionState::NeedSecondary;
                workload.pending_protection = Some(ProtectionState::Running);
            }
            OperationKind::RemoveProtection => {
                let replica_id = {
                    let workload = self.workload_mut(workload_id)?;
                    workload.protection_state = ProtectionState::Disabled;
                    workload.pending_protection = None;
                    workload.replica_id.take()
                };
                if let Some(replica_id) = replica_id {
                    self.remove_workload(&replica_id);
                }
            }
        }
        Ok(())
    }
}

/// In-memory management endpoint
#[derive(Debug, Default)]
pub struct SimulatedEndpoint {
    state: Mutex<SimState>,
}

impl SimulatedEndpoint {
    /// Build an endpoint holding the given inventory
    pub fn from_snapshot(snapshot: &InventorySnapshot) -> Self {
        let mut state = SimState::default();

        for cluster in &snapshot.clusters {
            let cluster_id = state.next_id("domain-c");
            let mut host_ids = Vec::with_capacity(cluster.hosts.len());

            for host in &cluster.hosts {
                let host_id = state.next_id("host");
                state.hosts.insert(
                    host_id.clone(),
                    SimHost {
                        id: host_id.clone(),
                        name: host.name.clone(),
                        connection_state: host.connection_state,
                        workload_ids: Vec::new(),
                    },
                );
                for workload in &host.workloads {
                    state.add_workload(&host_id, workload);
                }
                host_ids.push(host_id);
            }

            state.clusters.push(SimCluster {
                id: cluster_id,
                name: cluster.name.clone(),
                protection_enabled: cluster.protection_enabled,
                host_ids,
            });
        }

        info!(
            clusters = state.clusters.len(),
            hosts = state.hosts.len(),
            workloads = state.workloads.len(),
            "🧪 SIMULATOR: inventory loaded"
        );

        Self {
            state: Mutex::new(state),
        }
    }

    /// Read an inventory snapshot from a JSON file
    pub fn load_snapshot(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            LifecycleError::Snapshot(format!("cannot read {}: {e}", path.display()))
        })?;
        let snapshot: InventorySnapshot = serde_json::from_str(&raw).map_err(|e| {
            LifecycleError::Snapshot(format!("invalid snapshot {}: {e}", path.display()))
        })?;
        Ok(Self::from_snapshot(&snapshot))
    }

    /// Observed-state script for every operation of `kind` issued from now on
    pub fn script_operation(&self, kind: OperationKind, states: Vec<OperationState>) {
        self.state.lock().scripts.insert(kind, states);
    }

    /// Protection states the next observations of a workload return, in order
    pub fn script_protection(&self, workload_name: &str, states: Vec<ProtectionState>) {
        let mut state = self.state.lock();
        if let Some(id) = Self::primary_id(&state, workload_name) {
            if let Some(workload) = state.workloads.get_mut(&id) {
                workload.scripted_protection.extend(states);
            }
        }
    }

    /// Make every call at `point` fail with a communication error
    pub fn inject_fault(&self, point: FaultPoint) {
        self.state.lock().faults.insert(point);
    }

    /// Clear a previously injected fault
    pub fn clear_fault(&self, point: FaultPoint) {
        self.state.lock().faults.remove(&point);
    }

    /// Accept operations of `kind` without returning a handle
    pub fn withhold_handle(&self, kind: OperationKind) {
        self.state.lock().withheld.insert(kind);
    }

    /// Register every replica created from now on on `host_name`
    pub fn place_replicas_on(&self, host_name: &str) {
        let mut state = self.state.lock();
        let host_id = state
            .hosts
            .values()
            .find(|h| h.name == host_name)
            .map(|h| h.id.clone());
        state.replica_host = host_id;
    }

    /// Force the stored states of a workload
    pub fn set_workload_state(
        &self,
        workload_name: &str,
        power: PowerState,
        protection: ProtectionState,
    ) {
        let mut state = self.state.lock();
        if let Some(id) = Self::primary_id(&state, workload_name) {
            if let Some(workload) = state.workloads.get_mut(&id) {
                workload.power_state = power;
                workload.protection_state = protection;
                workload.pending_protection = None;
            }
        }
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<CallRecord> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Kinds of the long-running operations issued so far, in order
    pub fn issued_operations(&self) -> Vec<OperationKind> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| call.operation)
            .collect()
    }

    /// Protection states returned for a workload, in observation order
    pub fn protection_observations(&self, workload_name: &str) -> Vec<ProtectionState> {
        self.state
            .lock()
            .protection_log
            .iter()
            .filter(|(name, _)| name == workload_name)
            .map(|(_, observed)| *observed)
            .collect()
    }

    /// Current view of the primary workload with this name
    pub fn workload(&self, name: &str) -> Option<WorkloadRef> {
        let state = self.state.lock();
        Self::primary_id(&state, name)
            .and_then(|id| state.workloads.get(&id))
            .map(SimWorkload::to_workload_ref)
    }

    /// Names of the workloads registered on a host
    pub fn workloads_on(&self, host_name: &str) -> Vec<String> {
        let state = self.state.lock();
        state
            .hosts
            .values()
            .find(|h| h.name == host_name)
            .map(|host| {
                host.workload_ids
                    .iter()
                    .filter_map(|id| state.workloads.get(id))
                    .map(|w| w.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Replicas are registered after the snapshot, so the primary carries the lowest id
    fn primary_id(state: &SimState, name: &str) -> Option<String> {
        state
            .workloads
            .values()
            .filter(|w| w.name == name)
            .min_by_key(|w| Self::id_order(&w.id))
            .map(|w| w.id.clone())
    }

    fn id_order(id: &str) -> u64 {
        id.rsplit('-')
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or(u64::MAX)
    }
}

#[async_trait]
impl InventoryDirectory for SimulatedEndpoint {
    async fn list_clusters(&self) -> RemoteResult<Vec<ClusterCandidate>> {
        let mut state = self.state.lock();
        state.record("list_clusters", "inventory", None);
        state.check_fault(FaultPoint::ListClusters)?;
        Ok(state
            .clusters
            .iter()
            .map(|c| ClusterCandidate {
                id: c.id.clone(),
                name: c.name.clone(),
                protection_enabled: c.protection_enabled,
            })
            .collect())
    }

    async fn list_members(&self, cluster: &ClusterCandidate) -> RemoteResult<Vec<HostCandidate>> {
        let mut state = self.state.lock();
        state.record("list_members", &cluster.name, None);
        state.check_fault(FaultPoint::ListMembers)?;
        let sim_cluster = state
            .clusters
            .iter()
            .find(|c| c.id == cluster.id)
            .ok_or_else(|| RemoteError::not_found("Cluster", &cluster.name))?;
        Ok(sim_cluster
            .host_ids
            .iter()
            .filter_map(|id| state.hosts.get(id))
            .map(|h| HostCandidate {
                id: h.id.clone(),
                name: h.name.clone(),
                connection_state: h.connection_state,
            })
            .collect())
    }

    async fn list_workloads(&self, host: &HostCandidate) -> RemoteResult<Vec<WorkloadRef>> {
        let mut state = self.state.lock();
        state.record("list_workloads", &host.name, None);
        state.check_fault(FaultPoint::ListWorkloads)?;
        let sim_host = state
            .hosts
            .get(&host.id)
            .ok_or_else(|| RemoteError::not_found("Host", &host.name))?;
        Ok(sim_host
            .workload_ids
            .iter()
            .filter_map(|id| state.workloads.get(id))
            .map(SimWorkload::to_workload_ref)
            .collect())
    }
}

#[async_trait]
impl WorkloadApi for SimulatedEndpoint {
    async fn create_replica(
        &self,
        workload: &WorkloadRef,
        target_host: &HostCandidate,
    ) -> RemoteResult<Option<OperationHandle>> {
        self.state
            .lock()
            .issue(OperationKind::CreateReplica, workload, Some(&target_host.id))
    }

    async fn power_on(&self, workload: &WorkloadRef) -> RemoteResult<Option<OperationHandle>> {
        self.state.lock().issue(OperationKind::PowerOn, workload, None)
    }

    async fn power_off(&self, workload: &WorkloadRef) -> RemoteResult<Option<OperationHandle>> {
        self.state.lock().issue(OperationKind::PowerOff, workload, None)
    }

    async fn disable_replica(
        &self,
        workload: &WorkloadRef,
        _replica: &ReplicaRef,
    ) -> RemoteResult<Option<OperationHandle>> {
        self.state
            .lock()
            .issue(OperationKind::DisableReplica, workload, None)
    }

    async fn enable_replica(
        &self,
        workload: &WorkloadRef,
        _replica: &ReplicaRef,
        target_host: &HostCandidate,
    ) -> RemoteResult<Option<OperationHandle>> {
        self.state
            .lock()
            .issue(OperationKind::EnableReplica, workload, Some(&target_host.id))
    }

    async fn promote_replica(
        &self,
        workload: &WorkloadRef,
        _replica: &ReplicaRef,
    ) -> RemoteResult<Option<OperationHandle>> {
        self.state
            .lock()
            .issue(OperationKind::PromoteReplica, workload, None)
    }

    async fn remove_protection(
        &self,
        workload: &WorkloadRef,
    ) -> RemoteResult<Option<OperationHandle>> {
        self.state
            .lock()
            .issue(OperationKind::RemoveProtection, workload, None)
    }

    async fn protection_state(&self, workload: &WorkloadRef) -> RemoteResult<ProtectionState> {
        let mut state = self.state.lock();
        state.record("protection_state", &workload.name, None);
        state.check_fault(FaultPoint::ProtectionState)?;
        let sim = state.workload_mut(&workload.id)?;

        let observed = if let Some(scripted) = sim.scripted_protection.pop_front() {
            sim.protection_state = scripted;
            sim.pending_protection = None;
            scripted
        } else {
            let current = sim.protection_state;
            if let Some(next) = sim.pending_protection.take() {
                sim.protection_state = next;
            }
            current
        };
        state
            .protection_log
            .push((workload.name.clone(), observed));
        Ok(observed)
    }

    async fn power_state(&self, workload: &WorkloadRef) -> RemoteResult<PowerState> {
        let mut state = self.state.lock();
        state.record("power_state", &workload.name, None);
        state.check_fault(FaultPoint::PowerState)?;
        Ok(state.workload_mut(&workload.id)?.power_state)
    }
}

#[async_trait]
impl OperationApi for SimulatedEndpoint {
    async fn operation_state(&self, handle: &OperationHandle) -> RemoteResult<OperationState> {
        let mut state = self.state.lock();
        state.record("operation_state", &handle.id, None);
        state.check_fault(FaultPoint::OperationState)?;

        let operation = state
            .operations
            .get_mut(&handle.id)
            .ok_or_else(|| RemoteError::unknown_handle(&handle.id))?;
        let observed = if operation.script.len() > 1 {
            operation.script.pop_front()
        } else {
            operation.script.front().copied()
        }
        .unwrap_or(OperationState::Error);

        let effect = if observed.is_success() && !operation.applied {
            operation.applied = true;
            Some((
                operation.kind,
                operation.workload_id.clone(),
                operation.target_host_id.clone(),
            ))
        } else {
            None
        };

        if let Some((kind, workload_id, target_host_id)) = effect {
            state.apply_effect(kind, &workload_id, target_host_id.as_deref())?;
        }
        Ok(observed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> InventorySnapshot {
        InventorySnapshot {
            clusters: vec![ClusterSnapshot {
                name: "TestCluster".to_string(),
                protection_enabled: true,
                hosts: vec![
                    HostSnapshot {
                        name: "esx-a".to_string(),
                        connection_state: ConnectionState::Connected,
                        workloads: vec![WorkloadSnapshot::new("app-01")],
                    },
                    HostSnapshot {
                        name: "esx-b".to_string(),
                        connection_state: ConnectionState::Connected,
                        workloads: vec![],
                    },
                ],
            }],
        }
    }

    async fn drive(endpoint: &SimulatedEndpoint, handle: &OperationHandle) -> OperationState {
        loop {
            let state = endpoint.operation_state(handle).await.unwrap();
            if state.is_terminal() {
                return state;
            }
        }
    }

    #[tokio::test]
    async fn test_create_replica_registers_secondary() {
        let endpoint = SimulatedEndpoint::from_snapshot(&snapshot());
        let cluster = endpoint.find_cluster("TestCluster").await.unwrap().unwrap();
        let hosts = endpoint.list_members(&cluster).await.unwrap();
        let vm = endpoint.list_workloads(&hosts[0]).await.unwrap().remove(0);

        let handle = endpoint.create_replica(&vm, &hosts[1]).await.unwrap().unwrap();
        assert_eq!(drive(&endpoint, &handle).await, OperationState::Success);

        assert_eq!(endpoint.workloads_on("esx-b"), vec!["app-01".to_string()]);
        assert_eq!(
            endpoint.protection_state(&vm).await.unwrap(),
            ProtectionState::Enabled
        );
    }

    #[tokio::test]
    async fn test_scripted_operation_sticks_on_last_state() {
        let endpoint = SimulatedEndpoint::from_snapshot(&snapshot());
        endpoint.script_operation(OperationKind::PowerOn, vec![OperationState::Queued]);
        let vm = endpoint.workload("app-01").unwrap();

        let handle = endpoint.power_on(&vm).await.unwrap().unwrap();
        for _ in 0..3 {
            assert_eq!(
                endpoint.operation_state(&handle).await.unwrap(),
                OperationState::Queued
            );
        }
        assert_eq!(endpoint.workload("app-01").unwrap().power_state, PowerState::PoweredOff);
    }

    #[tokio::test]
    async fn test_power_on_with_protection_passes_through_starting() {
        let endpoint = SimulatedEndpoint::from_snapshot(&snapshot());
        endpoint.set_workload_state("app-01", PowerState::PoweredOff, ProtectionState::Enabled);
        let vm = endpoint.workload("app-01").unwrap();

        let handle = endpoint.power_on(&vm).await.unwrap().unwrap();
        drive(&endpoint, &handle).await;

        assert_eq!(endpoint.protection_state(&vm).await.unwrap(), ProtectionState::Starting);
        assert_eq!(endpoint.protection_state(&vm).await.unwrap(), ProtectionState::Running);
    }

    #[tokio::test]
    async fn test_injected_fault_and_withheld_handle() {
        let endpoint = SimulatedEndpoint::from_snapshot(&snapshot());
        let vm = endpoint.workload("app-01").unwrap();

        endpoint.inject_fault(FaultPoint::PowerState);
        assert!(matches!(
            endpoint.power_state(&vm).await,
            Err(RemoteError::Communication { .. })
        ));
        endpoint.clear_fault(FaultPoint::PowerState);
        assert!(endpoint.power_state(&vm).await.is_ok());

        endpoint.withhold_handle(OperationKind::PowerOff);
        assert_eq!(endpoint.power_off(&vm).await.unwrap(), None);
        assert_eq!(endpoint.issued_operations(), vec![OperationKind::PowerOff]);
    }

    #[test]
    fn test_snapshot_defaults() {
        let snapshot: InventorySnapshot = serde_json::from_str(
            r#"{"clusters":[{"name":"c1","hosts":[{"name":"h1","workloads":[{"name":"vm"}]}]}]}"#,
        )
        .unwrap();
        let host = &snapshot.clusters[0].hosts[0];
        assert!(!snapshot.clusters[0].protection_enabled);
        assert_eq!(host.connection_state, ConnectionState::Connected);
        assert_eq!(host.workloads[0].power_state, PowerState::PoweredOff);
    }
}
