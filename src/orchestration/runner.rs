//! # Lifecycle Runner
//!
//! One complete run: resolve the topology, drive the orchestrator, then always
//! hand the workload to the rollback guard, even when the orchestrator panics.

use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::lifecycle::LifecycleOrchestrator;
use super::rollback::RollbackGuard;
use super::types::{RollbackReport, RunContext, RunReport};
use crate::client::ManagementClient;
use crate::config::{LifecycleConfig, LifecyclePolicy, TargetConfig, TimeoutConfig};
use crate::constants::events;
use crate::polling::{CancelSignal, PollSettings};
use crate::topology::TopologyResolver;

pub struct LifecycleRunner<C: ?Sized> {
    resolver: TopologyResolver<C>,
    orchestrator: LifecycleOrchestrator<C>,
    rollback: RollbackGuard<C>,
}

impl<C: ManagementClient + ?Sized> LifecycleRunner<C> {
    pub fn new(client: Arc<C>, timeouts: TimeoutConfig, policy: LifecyclePolicy) -> Self {
        Self {
            resolver: TopologyResolver::new(client.clone()),
            rollback: RollbackGuard::new(client.clone(), &timeouts),
            orchestrator: LifecycleOrchestrator::new(client, timeouts, policy),
        }
    }

    pub fn from_config(client: Arc<C>, config: &LifecycleConfig) -> Self {
        Self::new(client, config.timeouts.clone(), config.lifecycle.clone())
    }

    /// Use `settings` for every wait of the run, rollback included
    ///
    /// A cancel signal in `settings` only reaches the orchestrator; rollback
    /// waits always run to completion.
    pub fn with_poll_settings(
        client: Arc<C>,
        timeouts: TimeoutConfig,
        policy: LifecyclePolicy,
        settings: PollSettings,
    ) -> Self {
        let rollback_settings = PollSettings {
            cancel: None,
            ..settings.clone()
        };
        Self {
            resolver: TopologyResolver::new(client.clone()),
            rollback: RollbackGuard::with_poll_settings(
                client.clone(),
                &timeouts,
                rollback_settings,
            ),
            orchestrator: LifecycleOrchestrator::with_poll_settings(
                client, timeouts, policy, settings,
            ),
        }
    }

    /// Stop the orchestrator's waits once `signal` fires; the rollback still runs
    pub fn with_cancel_signal(mut self, signal: CancelSignal) -> Self {
        self.orchestrator = self.orchestrator.with_cancel_signal(signal);
        self
    }

    /// Run against the target named in the configuration
    pub async fn run_target(&self, target: &TargetConfig) -> RunReport {
        self.run(&target.cluster_name, target.workload_name.as_deref())
            .await
    }

    /// Resolve, orchestrate, roll back
    pub async fn run(&self, cluster_name: &str, workload_name: Option<&str>) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        info!(
            event = events::RESOLUTION_STARTED,
            run_id = %run_id,
            cluster = %cluster_name,
            workload = workload_name.unwrap_or("<first available>"),
            "🔍 RUNNER: resolving topology"
        );

        let topology = match self.resolver.resolve(cluster_name, workload_name).await {
            Ok(topology) => topology,
            Err(e) => {
                error!(
                    event = events::RESOLUTION_FAILED,
                    run_id = %run_id,
                    error = %e,
                    "❌ RUNNER: topology resolution failed, nothing was changed"
                );
                let rollback = self.rollback.restore(None).await;
                return RunReport {
                    run_id,
                    cluster: cluster_name.to_string(),
                    workload: workload_name.map(str::to_string),
                    resolution: Some(e),
                    steps: Vec::new(),
                    rollback,
                    panicked: false,
                    started_at,
                    finished_at: Utc::now(),
                };
            }
        };
        info!(event = events::RESOLUTION_COMPLETED, run_id = %run_id, "✅ RUNNER: topology resolved");

        let mut ctx = RunContext::new(run_id, topology);

        let orchestrated = AssertUnwindSafe(self.orchestrator.run(&mut ctx))
            .catch_unwind()
            .await;
        let panicked = match orchestrated {
            Ok(()) => false,
            Err(panic) => {
                error!(
                    run_id = %run_id,
                    panic_msg = %panic_message(panic.as_ref()),
                    completed_steps = ctx.steps.len(),
                    "❌ RUNNER: caught a panic while performing protection operations"
                );
                true
            }
        };

        let restored = AssertUnwindSafe(self.rollback.restore(Some(&mut ctx.workload)))
            .catch_unwind()
            .await;
        let rollback = match restored {
            Ok(report) => report,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(run_id = %run_id, panic_msg = %message, "❌ RUNNER: rollback panicked");
                RollbackReport {
                    attempted: true,
                    actions: Vec::new(),
                    faults: vec![format!("rollback panicked: {message}")],
                }
            }
        };

        let report = RunReport {
            run_id,
            cluster: ctx.topology.cluster.name.clone(),
            workload: Some(ctx.workload.name.clone()),
            resolution: None,
            steps: ctx.steps,
            rollback,
            panicked,
            started_at,
            finished_at: Utc::now(),
        };

        if report.succeeded() {
            info!(run_id = %run_id, "✅ RUNNER: protection lifecycle completed");
        } else {
            warn!(
                run_id = %run_id,
                failed_step = ?report.failed_step().map(|record| record.step),
                panicked = report.panicked,
                "⚠️ RUNNER: protection lifecycle finished with failures"
            );
        }
        report
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{
        ClusterSnapshot, HostSnapshot, InventorySnapshot, SimulatedEndpoint, WorkloadSnapshot,
    };
    use crate::constants::exit_codes;
    use crate::state_machine::ConnectionState;

    fn runner(
        snapshot: &InventorySnapshot,
    ) -> (Arc<SimulatedEndpoint>, LifecycleRunner<SimulatedEndpoint>) {
        let endpoint = Arc::new(SimulatedEndpoint::from_snapshot(snapshot));
        let runner = LifecycleRunner::new(
            endpoint.clone(),
            TimeoutConfig::default().without_delays(),
            LifecyclePolicy::default(),
        );
        (endpoint, runner)
    }

    #[tokio::test]
    async fn test_resolution_failure_short_circuits() {
        let (endpoint, runner) = runner(&InventorySnapshot::default());
        let report = runner.run("TestCluster", None).await;

        assert!(report.resolution.is_some());
        assert!(!report.rollback.attempted);
        assert!(report.steps.is_empty());
        assert_eq!(report.exit_code(), exit_codes::RESOLUTION_FAILED);
        assert!(endpoint.issued_operations().is_empty());
    }

    #[tokio::test]
    async fn test_happy_path_report() {
        let snapshot = InventorySnapshot {
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
        };
        let (_endpoint, runner) = runner(&snapshot);
        let report = runner.run("TestCluster", None).await;

        assert!(report.succeeded());
        assert_eq!(report.workload.as_deref(), Some("app-01"));
        assert!(report.rollback.attempted);
        assert!(report.rollback.actions.is_empty());
        assert_eq!(report.exit_code(), exit_codes::SUCCESS);
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "Unknown panic");
    }
}
