//! # Task Monitor
//!
//! Polls a remote long-running operation until it reports `success` or `error`,
//! or until its observation budget is exhausted.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::poller::{poll_until, PollOutcome, PollSettings, PollStep};
use crate::client::OperationApi;
use crate::models::OperationHandle;
use crate::state_machine::OperationState;

pub struct TaskMonitor<C: ?Sized> {
    client: Arc<C>,
    settings: PollSettings,
}

impl<C: OperationApi + ?Sized> TaskMonitor<C> {
    pub fn new(client: Arc<C>, settings: PollSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    /// Wait for an operation to reach a terminal state
    ///
    /// An absent handle is a usage error and returns [`PollOutcome::MissingHandle`]
    /// without polling. `error` is final: the operation is never retried.
    pub async fn wait(&self, handle: Option<&OperationHandle>, timeout: Duration) -> PollOutcome {
        let Some(handle) = handle else {
            error!("❌ TASK_MONITOR: operation handle is missing, nothing to monitor");
            return PollOutcome::MissingHandle;
        };

        debug!(
            handle = %handle,
            timeout_seconds = timeout.as_secs(),
            "⏳ TASK_MONITOR: waiting for operation"
        );

        let client = &self.client;
        let outcome = poll_until(
            &self.settings,
            timeout,
            || client.operation_state(handle),
            |state: &OperationState| match state {
                OperationState::Queued | OperationState::Running => {
                    debug!(handle = %handle, state = %state, "Task is still running, wait for the task to complete");
                    PollStep::Continue
                }
                OperationState::Success => PollStep::Succeed,
                OperationState::Error => PollStep::Fail,
            },
        )
        .await;

        match &outcome {
            PollOutcome::Succeeded { observations } => {
                info!(handle = %handle, observations, "✅ TASK_MONITOR: task succeeded");
            }
            PollOutcome::Failed { observations } => {
                error!(handle = %handle, observations, "❌ TASK_MONITOR: task failed");
            }
            PollOutcome::TimedOut { observations } => {
                error!(
                    handle = %handle,
                    observations,
                    timeout_seconds = timeout.as_secs(),
                    "⏰ TASK_MONITOR: task did not finish within its timeout"
                );
            }
            PollOutcome::Faulted { message } => {
                error!(handle = %handle, error = %message, "❌ TASK_MONITOR: caught a fault while monitoring the task");
            }
            PollOutcome::Cancelled { observations } => {
                warn!(handle = %handle, observations, "🛑 TASK_MONITOR: wait cancelled");
            }
            PollOutcome::MissingHandle => {}
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{
        ClusterSnapshot, FaultPoint, HostSnapshot, InventorySnapshot, SimulatedEndpoint,
        WorkloadApi, WorkloadSnapshot,
    };
    use crate::models::OperationKind;
    use crate::state_machine::ConnectionState;

    fn endpoint() -> Arc<SimulatedEndpoint> {
        Arc::new(SimulatedEndpoint::from_snapshot(&InventorySnapshot {
            clusters: vec![ClusterSnapshot {
                name: "c1".to_string(),
                protection_enabled: true,
                hosts: vec![HostSnapshot {
                    name: "h1".to_string(),
                    connection_state: ConnectionState::Connected,
                    workloads: vec![WorkloadSnapshot::new("vm")],
                }],
            }],
        }))
    }

    async fn issue_power_on(endpoint: &SimulatedEndpoint) -> Option<OperationHandle> {
        let vm = endpoint.workload("vm").unwrap();
        endpoint.power_on(&vm).await.unwrap()
    }

    #[tokio::test]
    async fn test_success_returns_without_exhausting_budget() {
        let endpoint = endpoint();
        endpoint.script_operation(
            OperationKind::PowerOn,
            vec![OperationState::Queued, OperationState::Running, OperationState::Success],
        );
        let handle = issue_power_on(&endpoint).await;
        let monitor = TaskMonitor::new(endpoint.clone(), PollSettings::immediate());

        let outcome = monitor.wait(handle.as_ref(), Duration::from_secs(240)).await;
        assert_eq!(outcome, PollOutcome::Succeeded { observations: 3 });
    }

    #[tokio::test]
    async fn test_error_is_final() {
        let endpoint = endpoint();
        endpoint.script_operation(
            OperationKind::PowerOn,
            vec![OperationState::Running, OperationState::Error],
        );
        let handle = issue_power_on(&endpoint).await;
        let monitor = TaskMonitor::new(endpoint.clone(), PollSettings::immediate());

        let outcome = monitor.wait(handle.as_ref(), Duration::from_secs(240)).await;
        assert_eq!(outcome, PollOutcome::Failed { observations: 2 });
    }

    #[tokio::test]
    async fn test_timeout_after_budget() {
        let endpoint = endpoint();
        endpoint.script_operation(OperationKind::PowerOn, vec![OperationState::Running]);
        let handle = issue_power_on(&endpoint).await;
        let monitor = TaskMonitor::new(endpoint.clone(), PollSettings::immediate());

        let outcome = monitor.wait(handle.as_ref(), Duration::from_secs(120)).await;
        assert_eq!(outcome, PollOutcome::TimedOut { observations: 24 });
    }

    #[tokio::test]
    async fn test_missing_handle_is_distinct_from_timeout() {
        let endpoint = endpoint();
        let before = endpoint.call_count();
        let monitor = TaskMonitor::new(endpoint.clone(), PollSettings::immediate());

        let outcome = monitor.wait(None, Duration::from_secs(240)).await;
        assert_eq!(outcome, PollOutcome::MissingHandle);
        assert_eq!(endpoint.call_count(), before);
    }

    #[tokio::test]
    async fn test_query_fault_is_swallowed() {
        let endpoint = endpoint();
        let handle = issue_power_on(&endpoint).await;
        endpoint.inject_fault(FaultPoint::OperationState);
        let monitor = TaskMonitor::new(endpoint.clone(), PollSettings::immediate());

        let outcome = monitor.wait(handle.as_ref(), Duration::from_secs(240)).await;
        assert!(matches!(outcome, PollOutcome::Faulted { .. }));
    }
}
