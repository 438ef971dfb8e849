//! # State Waiter
//!
//! Polls a workload's protection state until a [`ProtectionGuard`] reports its
//! target reached. Same budget and interval semantics as the task monitor; the
//! only failure mode besides faults is budget exhaustion.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::poller::{poll_until, PollOutcome, PollSettings, PollStep};
use crate::client::WorkloadApi;
use crate::models::WorkloadRef;
use crate::state_machine::{FailoverStartedGuard, ProtectedGuard, ProtectionGuard, ProtectionState};

pub struct StateWaiter<C: ?Sized> {
    client: Arc<C>,
    settings: PollSettings,
}

impl<C: WorkloadApi + ?Sized> StateWaiter<C> {
    pub fn new(client: Arc<C>, settings: PollSettings) -> Self {
        Self { client, settings }
    }

    /// Wait until primary and secondary are both running
    pub async fn wait_for_protected(
        &self,
        workload: &mut WorkloadRef,
        timeout: Duration,
    ) -> PollOutcome {
        self.wait_for(&ProtectedGuard, workload, timeout).await
    }

    /// Wait until the pair drops out of `running` after a promotion
    pub async fn wait_for_failover_started(
        &self,
        workload: &mut WorkloadRef,
        timeout: Duration,
    ) -> PollOutcome {
        self.wait_for(&FailoverStartedGuard, workload, timeout).await
    }

    /// Poll until `guard` is satisfied; the last observed state is written back to `workload`
    pub async fn wait_for(
        &self,
        guard: &dyn ProtectionGuard,
        workload: &mut WorkloadRef,
        timeout: Duration,
    ) -> PollOutcome {
        debug!(
            workload = %workload.name,
            guard = guard.description(),
            timeout_seconds = timeout.as_secs(),
            "⏳ STATE_WAITER: waiting for protection state"
        );

        let mut last_observed: Option<ProtectionState> = None;
        let outcome = {
            let client = &self.client;
            let target = &*workload;
            poll_until(
                &self.settings,
                timeout,
                || client.protection_state(target),
                |state: &ProtectionState| {
                    last_observed = Some(*state);
                    if guard.evaluate(*state).is_reached() {
                        PollStep::Succeed
                    } else {
                        debug!(workload = %target.name, state = %state, "Protection state not reached yet, keep waiting");
                        PollStep::Continue
                    }
                },
            )
            .await
        };

        if let Some(state) = last_observed {
            workload.observe_protection(state);
        }

        match &outcome {
            PollOutcome::Succeeded { observations } => {
                info!(
                    workload = %workload.name,
                    state = %workload.protection_state,
                    observations,
                    "✅ STATE_WAITER: protection state reached"
                );
            }
            PollOutcome::TimedOut { observations } => {
                error!(
                    workload = %workload.name,
                    guard = guard.description(),
                    last_state = %workload.protection_state,
                    observations,
                    "⏰ STATE_WAITER: protection state not reached within timeout"
                );
            }
            PollOutcome::Faulted { message } => {
                error!(workload = %workload.name, error = %message, "❌ STATE_WAITER: caught a fault while monitoring protection state");
            }
            PollOutcome::Cancelled { observations } => {
                warn!(workload = %workload.name, observations, "🛑 STATE_WAITER: wait cancelled");
            }
            PollOutcome::Failed { .. } | PollOutcome::MissingHandle => {}
        }

        outcome
    }
}
