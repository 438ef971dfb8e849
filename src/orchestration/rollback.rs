//! # Rollback Guard
//!
//! Best-effort restoration of the workload at the end of every run: power it
//! off when it is running, then strip protection when it is still removable.
//! Faults are recorded in the [`RollbackReport`] and never raised.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::types::{RollbackAction, RollbackReport};
use crate::client::{ManagementClient, RemoteResult};
use crate::config::TimeoutConfig;
use crate::constants::events;
use crate::models::{OperationHandle, OperationKind, WorkloadRef};
use crate::polling::{PollOutcome, PollSettings, TaskMonitor};
use crate::state_machine::PowerState;

pub struct RollbackGuard<C: ?Sized> {
    client: Arc<C>,
    monitor: TaskMonitor<C>,
    task_timeout: Duration,
    settle_delay: Duration,
}

impl<C: ManagementClient + ?Sized> RollbackGuard<C> {
    pub fn new(client: Arc<C>, timeouts: &TimeoutConfig) -> Self {
        Self::with_poll_settings(client, timeouts, PollSettings::from(timeouts))
    }

    /// Rollback waits ignore cancellation: `settings` should carry no cancel signal
    pub fn with_poll_settings(
        client: Arc<C>,
        timeouts: &TimeoutConfig,
        settings: PollSettings,
    ) -> Self {
        Self {
            monitor: TaskMonitor::new(client.clone(), settings),
            client,
            task_timeout: timeouts.task_timeout(),
            settle_delay: timeouts.settle_delay(),
        }
    }

    /// Restore the workload resolved during the run; `None` is a no-op
    pub async fn restore(&self, workload: Option<&mut WorkloadRef>) -> RollbackReport {
        let Some(workload) = workload else {
            info!(event = events::ROLLBACK_COMPLETED, "No workload was resolved, nothing to restore");
            return RollbackReport::not_attempted();
        };

        info!(
            event = events::ROLLBACK_STARTED,
            workload = %workload.name,
            "* * * * Restore workload state * * * *"
        );
        let mut report = RollbackReport {
            attempted: true,
            ..RollbackReport::default()
        };

        self.settle().await;
        self.power_off_if_running(workload, &mut report).await;
        self.remove_protection_if_enabled(workload, &mut report).await;

        if report.is_clean() {
            info!(
                event = events::ROLLBACK_COMPLETED,
                workload = %workload.name,
                operations = report.actions.len(),
                "✅ ROLLBACK: workload state restored"
            );
        } else {
            error!(
                event = events::ROLLBACK_COMPLETED,
                workload = %workload.name,
                faults = ?report.faults,
                "❌ ROLLBACK: could not fully restore the workload, check and restore its state manually"
            );
        }
        report
    }

    async fn power_off_if_running(&self, workload: &mut WorkloadRef, report: &mut RollbackReport) {
        match self.client.power_state(workload).await {
            Ok(state) => workload.observe_power(state),
            Err(e) => {
                warn!(workload = %workload.name, error = %e, "⚠️ ROLLBACK: could not read power state");
                report.faults.push(format!("power state: {e}"));
                return;
            }
        }
        if !workload.power_state.is_powered_on() {
            return;
        }

        let issued = self.client.power_off(workload).await;
        let outcome = self.track(OperationKind::PowerOff, issued, report).await;
        if outcome.is_success() {
            info!(workload = %workload.name, "Successfully powered off the workload");
            workload.observe_power(PowerState::PoweredOff);
            self.settle().await;
        }
    }

    async fn remove_protection_if_enabled(
        &self,
        workload: &mut WorkloadRef,
        report: &mut RollbackReport,
    ) {
        match self.client.protection_state(workload).await {
            Ok(state) => workload.observe_protection(state),
            Err(e) => {
                warn!(workload = %workload.name, error = %e, "⚠️ ROLLBACK: could not read protection state");
                report.faults.push(format!("protection state: {e}"));
                return;
            }
        }
        if !workload.protection_state.is_removable() {
            return;
        }

        let issued = self.client.remove_protection(workload).await;
        if self
            .track(OperationKind::RemoveProtection, issued, report)
            .await
            .is_success()
        {
            info!(workload = %workload.name, "Successfully turned off protection");
        }
    }

    async fn track(
        &self,
        operation: OperationKind,
        issued: RemoteResult<Option<OperationHandle>>,
        report: &mut RollbackReport,
    ) -> PollOutcome {
        let outcome = match issued {
            Ok(handle) => self.monitor.wait(handle.as_ref(), self.task_timeout).await,
            Err(e) => PollOutcome::Faulted {
                message: e.to_string(),
            },
        };
        report.actions.push(RollbackAction {
            operation,
            outcome: outcome.clone(),
        });
        outcome
    }

    async fn settle(&self) {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
    }
}
