//! # Lifecycle Orchestrator
//!
//! Drives the fixed protection lifecycle over one workload:
//!
//! ```text
//! enable protection → power on → await protected
//!   → discover replica → disable replica → enable replica → await re-protected
//!   → promote replica → await failover started → await protected
//! → disable protection
//! ```
//!
//! Every step is recorded in the [`RunContext`]. A failure skips the steps that
//! depend on it; removing protection is attempted whenever it was turned on.
//! Nothing here returns an error: failures are recorded outcomes and the
//! rollback guard runs afterwards regardless.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::types::{FailureKind, LifecycleStep, RunContext, SkipReason, StepOutcome};
use crate::client::{ManagementClient, RemoteResult};
use crate::config::{LifecyclePolicy, TimeoutConfig};
use crate::constants::events;
use crate::logging::{log_protection_state, log_step_outcome};
use crate::models::{OperationHandle, ReplicaRef};
use crate::polling::{CancelSignal, PollSettings, StateWaiter, TaskMonitor};

const REPLICA_STEPS: [LifecycleStep; 7] = [
    LifecycleStep::DiscoverReplica,
    LifecycleStep::DisableReplica,
    LifecycleStep::EnableReplica,
    LifecycleStep::AwaitReprotected,
    LifecycleStep::PromoteReplica,
    LifecycleStep::AwaitFailoverStarted,
    LifecycleStep::AwaitPromotedProtected,
];

const PROMOTION_STEPS: [LifecycleStep; 3] = [
    LifecycleStep::PromoteReplica,
    LifecycleStep::AwaitFailoverStarted,
    LifecycleStep::AwaitPromotedProtected,
];

pub struct LifecycleOrchestrator<C: ?Sized> {
    client: Arc<C>,
    monitor: TaskMonitor<C>,
    waiter: StateWaiter<C>,
    timeouts: TimeoutConfig,
    policy: LifecyclePolicy,
}

impl<C: ManagementClient + ?Sized> LifecycleOrchestrator<C> {
    pub fn new(client: Arc<C>, timeouts: TimeoutConfig, policy: LifecyclePolicy) -> Self {
        let settings = PollSettings::from(&timeouts);
        Self::with_poll_settings(client, timeouts, policy, settings)
    }

    pub fn with_poll_settings(
        client: Arc<C>,
        timeouts: TimeoutConfig,
        policy: LifecyclePolicy,
        settings: PollSettings,
    ) -> Self {
        Self {
            monitor: TaskMonitor::new(client.clone(), settings.clone()),
            waiter: StateWaiter::new(client.clone(), settings),
            client,
            timeouts,
            policy,
        }
    }

    /// Stop every wait of this orchestrator at its next pause once `signal` fires
    pub fn with_cancel_signal(self, signal: CancelSignal) -> Self {
        let settings = self.monitor.settings().clone().with_cancel_signal(signal);
        Self::with_poll_settings(self.client, self.timeouts, self.policy, settings)
    }

    /// Run every step against the workload held by `ctx`
    pub async fn run(&self, ctx: &mut RunContext) {
        info!(
            run_id = %ctx.run_id,
            workload = %ctx.workload.name,
            primary_host = %ctx.topology.primary_host.name,
            secondary_host = %ctx.topology.secondary_host.name,
            "🚀 LIFECYCLE: starting protection lifecycle"
        );

        if self.protect(ctx).await {
            self.exercise_replica(ctx).await;
        }
        self.disable_protection(ctx).await;

        info!(
            run_id = %ctx.run_id,
            workload = %ctx.workload.name,
            failed_steps = ctx.steps.iter().filter(|r| r.outcome.is_failure()).count(),
            "🏁 LIFECYCLE: step sequence finished"
        );
    }

    /// Steps 1 to 3: turn protection on and wait for the pair to run
    async fn protect(&self, ctx: &mut RunContext) -> bool {
        let task_timeout = self.timeouts.task_timeout();

        self.announce(ctx, LifecycleStep::EnableProtection);
        let issued = self
            .client
            .create_replica(&ctx.workload, &ctx.topology.secondary_host)
            .await;
        let outcome = self.track(issued, task_timeout).await;
        if !self.finish(ctx, LifecycleStep::EnableProtection, outcome) {
            self.skip_all(
                ctx,
                &[
                    LifecycleStep::PowerOnPrimary,
                    LifecycleStep::AwaitProtected,
                ],
                LifecycleStep::EnableProtection,
            );
            self.skip_all(ctx, &REPLICA_STEPS, LifecycleStep::EnableProtection);
            return false;
        }
        ctx.protection_enabled = true;

        self.announce(ctx, LifecycleStep::PowerOnPrimary);
        let issued = self.client.power_on(&ctx.workload).await;
        let outcome = self.track(issued, task_timeout).await;
        if !self.finish(ctx, LifecycleStep::PowerOnPrimary, outcome) {
            self.skip_all(ctx, &[LifecycleStep::AwaitProtected], LifecycleStep::PowerOnPrimary);
            self.skip_all(ctx, &REPLICA_STEPS, LifecycleStep::PowerOnPrimary);
            return false;
        }
        self.refresh_power_state(ctx).await;

        self.announce(ctx, LifecycleStep::AwaitProtected);
        let polled = self
            .waiter
            .wait_for_protected(&mut ctx.workload, task_timeout)
            .await;
        if !self.finish(ctx, LifecycleStep::AwaitProtected, StepOutcome::from_poll(&polled)) {
            self.skip_all(ctx, &REPLICA_STEPS, LifecycleStep::AwaitProtected);
            return false;
        }
        log_protection_state(&ctx.workload, ctx.workload.protection_state);
        true
    }

    /// Steps 4 to 7: cycle the replica and exercise a failover
    async fn exercise_replica(&self, ctx: &mut RunContext) {
        let task_timeout = self.timeouts.task_timeout();

        self.announce(ctx, LifecycleStep::DiscoverReplica);
        let (outcome, discovered) = match self.discover_replica(ctx).await {
            Ok(Some(replica)) => {
                info!(replica_id = %replica.id, host = %ctx.topology.secondary_host.name, "Secondary replica located");
                (StepOutcome::Succeeded, Some(replica))
            }
            Ok(None) => (StepOutcome::failed(FailureKind::ReplicaNotFound), None),
            Err(e) => (
                StepOutcome::failed(FailureKind::RemoteFault {
                    message: e.to_string(),
                }),
                None,
            ),
        };
        self.finish(ctx, LifecycleStep::DiscoverReplica, outcome);
        let Some(replica) = discovered else {
            self.skip_all(ctx, &REPLICA_STEPS[1..], LifecycleStep::DiscoverReplica);
            return;
        };
        ctx.replica = Some(replica.clone());

        self.announce(ctx, LifecycleStep::DisableReplica);
        let issued = self.client.disable_replica(&ctx.workload, &replica).await;
        let outcome = self
            .track(issued, self.timeouts.disable_replica_timeout())
            .await;
        if !self.finish(ctx, LifecycleStep::DisableReplica, outcome) {
            self.skip_all(ctx, &REPLICA_STEPS[2..], LifecycleStep::DisableReplica);
            return;
        }
        self.refresh_protection_state(ctx).await;

        let reprotected = self.reenable_replica(ctx, &replica).await;
        if !reprotected && self.policy.require_reprotection_before_promote {
            for step in PROMOTION_STEPS {
                self.finish(ctx, step, StepOutcome::skipped(SkipReason::ReprotectionRequired));
            }
            return;
        }

        self.announce(ctx, LifecycleStep::PromoteReplica);
        let issued = self.client.promote_replica(&ctx.workload, &replica).await;
        let outcome = self.track(issued, task_timeout).await;
        if !self.finish(ctx, LifecycleStep::PromoteReplica, outcome) {
            self.skip_all(ctx, &PROMOTION_STEPS[1..], LifecycleStep::PromoteReplica);
            return;
        }

        self.announce(ctx, LifecycleStep::AwaitFailoverStarted);
        let polled = self
            .waiter
            .wait_for_failover_started(&mut ctx.workload, task_timeout)
            .await;
        if !self.finish(
            ctx,
            LifecycleStep::AwaitFailoverStarted,
            StepOutcome::from_poll(&polled),
        ) {
            warn!(workload = %ctx.workload.name, "Protection did not enter needSecondary/starting after the test failover");
            self.skip_all(
                ctx,
                &PROMOTION_STEPS[2..],
                LifecycleStep::AwaitFailoverStarted,
            );
            return;
        }

        info!(workload = %ctx.workload.name, "Now, wait for the secondary to come up");
        self.announce(ctx, LifecycleStep::AwaitPromotedProtected);
        let polled = self
            .waiter
            .wait_for_protected(&mut ctx.workload, task_timeout)
            .await;
        if self.finish(
            ctx,
            LifecycleStep::AwaitPromotedProtected,
            StepOutcome::from_poll(&polled),
        ) {
            log_protection_state(&ctx.workload, ctx.workload.protection_state);
        }
    }

    /// Step 6: re-enable the replica and wait for the pair to re-protect
    async fn reenable_replica(&self, ctx: &mut RunContext, replica: &ReplicaRef) -> bool {
        let task_timeout = self.timeouts.task_timeout();

        self.announce(ctx, LifecycleStep::EnableReplica);
        let issued = self
            .client
            .enable_replica(&ctx.workload, replica, &ctx.topology.secondary_host)
            .await;
        let outcome = self.track(issued, task_timeout).await;
        if !self.finish(ctx, LifecycleStep::EnableReplica, outcome) {
            self.skip_all(ctx, &[LifecycleStep::AwaitReprotected], LifecycleStep::EnableReplica);
            return false;
        }

        self.announce(ctx, LifecycleStep::AwaitReprotected);
        let polled = self
            .waiter
            .wait_for_protected(&mut ctx.workload, task_timeout)
            .await;
        let reprotected =
            self.finish(ctx, LifecycleStep::AwaitReprotected, StepOutcome::from_poll(&polled));
        if reprotected {
            log_protection_state(&ctx.workload, ctx.workload.protection_state);
        }
        reprotected
    }

    /// Step 8: remove protection if it was ever turned on and is still removable
    async fn disable_protection(&self, ctx: &mut RunContext) {
        let step = LifecycleStep::DisableProtection;
        if !ctx.protection_enabled {
            self.finish(ctx, step, StepOutcome::skipped(SkipReason::ProtectionNeverEnabled));
            return;
        }

        self.announce(ctx, step);
        let state = match self.client.protection_state(&ctx.workload).await {
            Ok(state) => state,
            Err(e) => {
                self.finish(
                    ctx,
                    step,
                    StepOutcome::failed(FailureKind::RemoteFault {
                        message: e.to_string(),
                    }),
                );
                return;
            }
        };
        ctx.workload.observe_protection(state);

        if !state.is_removable() {
            self.finish(ctx, step, StepOutcome::skipped(SkipReason::NotRemovable { state }));
            return;
        }

        let issued = self.client.remove_protection(&ctx.workload).await;
        let outcome = self.track(issued, self.timeouts.task_timeout()).await;
        self.finish(ctx, step, outcome);
    }

    /// Scan the secondary host for the primary's namesake
    async fn discover_replica(&self, ctx: &RunContext) -> RemoteResult<Option<ReplicaRef>> {
        let workloads = self
            .client
            .list_workloads(&ctx.topology.secondary_host)
            .await?;
        Ok(workloads
            .iter()
            .find(|w| w.name == ctx.workload.name && w.id != ctx.workload.id)
            .map(ReplicaRef::from))
    }

    /// Read and log the current protection state; faults only warn
    async fn refresh_protection_state(&self, ctx: &mut RunContext) {
        match self.client.protection_state(&ctx.workload).await {
            Ok(state) => {
                ctx.workload.observe_protection(state);
                log_protection_state(&ctx.workload, state);
            }
            Err(e) => {
                warn!(workload = %ctx.workload.name, error = %e, "Could not read protection state");
            }
        }
    }

    async fn refresh_power_state(&self, ctx: &mut RunContext) {
        match self.client.power_state(&ctx.workload).await {
            Ok(state) => ctx.workload.observe_power(state),
            Err(e) => {
                warn!(workload = %ctx.workload.name, error = %e, "Could not read power state");
            }
        }
    }

    /// Monitor an issued operation to completion
    async fn track(
        &self,
        issued: RemoteResult<Option<OperationHandle>>,
        timeout: Duration,
    ) -> StepOutcome {
        match issued {
            Ok(handle) => StepOutcome::from_poll(&self.monitor.wait(handle.as_ref(), timeout).await),
            Err(e) => StepOutcome::failed(FailureKind::RemoteFault {
                message: e.to_string(),
            }),
        }
    }

    fn announce(&self, ctx: &RunContext, step: LifecycleStep) {
        info!(
            event = events::STEP_STARTED,
            step = %step,
            workload = %ctx.workload.name,
            "* * * * {} * * * *",
            step
        );
    }

    /// Record a step outcome and report whether it succeeded
    fn finish(&self, ctx: &mut RunContext, step: LifecycleStep, outcome: StepOutcome) -> bool {
        log_step_outcome(step, &ctx.workload, &outcome);
        let succeeded = outcome.is_success();
        ctx.record(step, outcome);
        succeeded
    }

    fn skip_all(&self, ctx: &mut RunContext, steps: &[LifecycleStep], failed: LifecycleStep) {
        for step in steps {
            self.finish(
                ctx,
                *step,
                StepOutcome::skipped(SkipReason::DependencyFailed { step: failed }),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{
        ClusterSnapshot, FaultPoint, HostSnapshot, InventorySnapshot, SimulatedEndpoint,
        WorkloadSnapshot,
    };
    use crate::models::OperationKind;
    use crate::state_machine::{ConnectionState, OperationState, PowerState, ProtectionState};
    use crate::topology::TopologyResolver;
    use uuid::Uuid;

    fn endpoint() -> Arc<SimulatedEndpoint> {
        Arc::new(SimulatedEndpoint::from_snapshot(&InventorySnapshot {
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
        }))
    }

    async fn context(endpoint: &Arc<SimulatedEndpoint>) -> RunContext {
        let topology = TopologyResolver::new(endpoint.clone())
            .resolve("TestCluster", Some("app-01"))
            .await
            .unwrap();
        RunContext::new(Uuid::new_v4(), topology)
    }

    fn orchestrator(
        endpoint: &Arc<SimulatedEndpoint>,
        policy: LifecyclePolicy,
    ) -> LifecycleOrchestrator<SimulatedEndpoint> {
        LifecycleOrchestrator::new(
            endpoint.clone(),
            TimeoutConfig::default().without_delays(),
            policy,
        )
    }

    #[tokio::test]
    async fn test_full_sequence_succeeds() {
        let endpoint = endpoint();
        let mut ctx = context(&endpoint).await;

        orchestrator(&endpoint, LifecyclePolicy::default())
            .run(&mut ctx)
            .await;

        let steps: Vec<_> = ctx.steps.iter().map(|r| r.step).collect();
        assert_eq!(steps, LifecycleStep::ALL.to_vec());
        assert!(ctx.steps.iter().all(|r| r.outcome.is_success()));
        assert_eq!(
            endpoint.issued_operations(),
            vec![
                OperationKind::CreateReplica,
                OperationKind::PowerOn,
                OperationKind::DisableReplica,
                OperationKind::EnableReplica,
                OperationKind::PromoteReplica,
                OperationKind::RemoveProtection,
            ]
        );
        assert!(ctx.replica.is_some());
    }

    #[tokio::test]
    async fn test_power_state_is_read_back_after_power_on() {
        let endpoint = endpoint();
        let mut ctx = context(&endpoint).await;

        orchestrator(&endpoint, LifecyclePolicy::default())
            .run(&mut ctx)
            .await;

        let calls = endpoint.calls();
        let power_on = calls
            .iter()
            .position(|call| call.operation == Some(OperationKind::PowerOn))
            .unwrap();
        assert!(calls[power_on..]
            .iter()
            .any(|call| call.method == "power_state" && call.subject == "app-01"));
        assert_eq!(ctx.workload.power_state, PowerState::PoweredOn);
    }

    #[tokio::test]
    async fn test_unreadable_power_state_is_not_assumed() {
        let endpoint = endpoint();
        endpoint.inject_fault(FaultPoint::PowerState);
        let mut ctx = context(&endpoint).await;

        orchestrator(&endpoint, LifecyclePolicy::default())
            .run(&mut ctx)
            .await;

        assert!(ctx.succeeded(LifecycleStep::PowerOnPrimary));
        assert!(ctx.succeeded(LifecycleStep::AwaitProtected));
        assert_eq!(ctx.workload.power_state, PowerState::PoweredOff);
    }

    #[tokio::test]
    async fn test_power_on_failure_still_removes_protection() {
        let endpoint = endpoint();
        endpoint.script_operation(OperationKind::PowerOn, vec![OperationState::Error]);
        let mut ctx = context(&endpoint).await;

        orchestrator(&endpoint, LifecyclePolicy::default())
            .run(&mut ctx)
            .await;

        assert!(ctx.outcome_of(LifecycleStep::PowerOnPrimary).unwrap().is_failure());
        assert_eq!(
            ctx.outcome_of(LifecycleStep::PromoteReplica),
            Some(&StepOutcome::skipped(SkipReason::DependencyFailed {
                step: LifecycleStep::PowerOnPrimary
            }))
        );
        assert!(ctx.succeeded(LifecycleStep::DisableProtection));
        assert_eq!(
            endpoint.issued_operations(),
            vec![
                OperationKind::CreateReplica,
                OperationKind::PowerOn,
                OperationKind::RemoveProtection,
            ]
        );
    }

    #[tokio::test]
    async fn test_disable_replica_failure_skips_promotion() {
        let endpoint = endpoint();
        endpoint.script_operation(OperationKind::DisableReplica, vec![OperationState::Running]);
        let mut ctx = context(&endpoint).await;

        orchestrator(&endpoint, LifecyclePolicy::default())
            .run(&mut ctx)
            .await;

        assert_eq!(
            ctx.outcome_of(LifecycleStep::DisableReplica),
            Some(&StepOutcome::failed(FailureKind::TimedOut { observations: 24 }))
        );
        assert!(!endpoint
            .issued_operations()
            .contains(&OperationKind::PromoteReplica));
        assert!(ctx.succeeded(LifecycleStep::DisableProtection));
    }

    #[tokio::test]
    async fn test_enable_replica_failure_still_promotes_by_default() {
        let endpoint = endpoint();
        endpoint.script_operation(OperationKind::EnableReplica, vec![OperationState::Error]);
        let mut ctx = context(&endpoint).await;

        orchestrator(&endpoint, LifecyclePolicy::default())
            .run(&mut ctx)
            .await;

        assert!(ctx.outcome_of(LifecycleStep::EnableReplica).unwrap().is_failure());
        assert!(endpoint
            .issued_operations()
            .contains(&OperationKind::PromoteReplica));
    }

    #[tokio::test]
    async fn test_reprotection_policy_blocks_promotion() {
        let endpoint = endpoint();
        endpoint.script_operation(OperationKind::EnableReplica, vec![OperationState::Error]);
        let mut ctx = context(&endpoint).await;
        let policy = LifecyclePolicy {
            require_reprotection_before_promote: true,
        };

        orchestrator(&endpoint, policy).run(&mut ctx).await;

        assert_eq!(
            ctx.outcome_of(LifecycleStep::PromoteReplica),
            Some(&StepOutcome::skipped(SkipReason::ReprotectionRequired))
        );
        assert!(!endpoint
            .issued_operations()
            .contains(&OperationKind::PromoteReplica));
    }

    #[tokio::test]
    async fn test_missing_replica_is_a_soft_failure() {
        let endpoint = Arc::new(SimulatedEndpoint::from_snapshot(&InventorySnapshot {
            clusters: vec![ClusterSnapshot {
                name: "TestCluster".to_string(),
                protection_enabled: true,
                hosts: ["esx-a", "esx-b", "esx-c"]
                    .iter()
                    .map(|name| HostSnapshot {
                        name: name.to_string(),
                        connection_state: ConnectionState::Connected,
                        workloads: if *name == "esx-a" {
                            vec![WorkloadSnapshot::new("app-01")]
                        } else {
                            vec![]
                        },
                    })
                    .collect(),
            }],
        }));
        endpoint.place_replicas_on("esx-c");
        let mut ctx = context(&endpoint).await;
        assert_eq!(ctx.topology.secondary_host.name, "esx-b");

        orchestrator(&endpoint, LifecyclePolicy::default())
            .run(&mut ctx)
            .await;

        assert_eq!(
            ctx.outcome_of(LifecycleStep::DiscoverReplica),
            Some(&StepOutcome::failed(FailureKind::ReplicaNotFound))
        );
        assert_eq!(ctx.replica, None);
        assert_eq!(
            endpoint.issued_operations(),
            vec![
                OperationKind::CreateReplica,
                OperationKind::PowerOn,
                OperationKind::RemoveProtection,
            ]
        );
    }

    #[tokio::test]
    async fn test_replica_discovery_fault_skips_replica_steps() {
        let endpoint = endpoint();
        let mut ctx = context(&endpoint).await;
        endpoint.inject_fault(FaultPoint::ListWorkloads);

        orchestrator(&endpoint, LifecyclePolicy::default())
            .run(&mut ctx)
            .await;

        assert!(matches!(
            ctx.outcome_of(LifecycleStep::DiscoverReplica),
            Some(StepOutcome::Failed {
                failure: FailureKind::RemoteFault { .. }
            })
        ));
        assert_eq!(
            ctx.outcome_of(LifecycleStep::DisableReplica),
            Some(&StepOutcome::skipped(SkipReason::DependencyFailed {
                step: LifecycleStep::DiscoverReplica
            }))
        );
    }

    #[tokio::test]
    async fn test_withheld_handle_is_missing_handle_failure() {
        let endpoint = endpoint();
        endpoint.withhold_handle(OperationKind::CreateReplica);
        let mut ctx = context(&endpoint).await;

        orchestrator(&endpoint, LifecyclePolicy::default())
            .run(&mut ctx)
            .await;

        assert_eq!(
            ctx.outcome_of(LifecycleStep::EnableProtection),
            Some(&StepOutcome::failed(FailureKind::MissingHandle))
        );
        assert_eq!(
            ctx.outcome_of(LifecycleStep::DisableProtection),
            Some(&StepOutcome::skipped(SkipReason::ProtectionNeverEnabled))
        );
        assert_eq!(ctx.steps.len(), LifecycleStep::ALL.len());
    }

    #[tokio::test]
    async fn test_promotion_failure_still_removes_protection() {
        let endpoint = endpoint();
        endpoint.script_operation(OperationKind::PromoteReplica, vec![OperationState::Error]);
        let mut ctx = context(&endpoint).await;

        orchestrator(&endpoint, LifecyclePolicy::default())
            .run(&mut ctx)
            .await;

        assert!(ctx.outcome_of(LifecycleStep::PromoteReplica).unwrap().is_failure());
        assert!(ctx.succeeded(LifecycleStep::DisableProtection));
        assert_eq!(ctx.workload.protection_state, ProtectionState::Running);
    }

    #[tokio::test]
    async fn test_disable_protection_skips_non_removable_state() {
        let endpoint = endpoint();
        let mut ctx = context(&endpoint).await;
        ctx.protection_enabled = true;
        endpoint.set_workload_state("app-01", PowerState::PoweredOff, ProtectionState::Disabled);

        orchestrator(&endpoint, LifecyclePolicy::default())
            .disable_protection(&mut ctx)
            .await;

        assert_eq!(
            ctx.outcome_of(LifecycleStep::DisableProtection),
            Some(&StepOutcome::skipped(SkipReason::NotRemovable {
                state: ProtectionState::Disabled
            }))
        );
        assert!(endpoint.issued_operations().is_empty());
    }
}
