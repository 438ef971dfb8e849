//! # Orchestration Engine
//!
//! The protection lifecycle proper.
//!
//! ## Core Components
//!
//! - **LifecycleOrchestrator**: drives the fixed step sequence over one workload, branching on each outcome
//! - **RollbackGuard**: powers the workload off and strips protection at the end of every run
//! - **LifecycleRunner**: resolve → orchestrate → roll back, with the rollback guaranteed even on panic
//! - **RunContext / RunReport**: explicit per-run state and the typed result handed back to the caller
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use ft_lifecycle::client::{ClusterSnapshot, HostSnapshot, InventorySnapshot, SimulatedEndpoint, WorkloadSnapshot};
//! use ft_lifecycle::config::{LifecyclePolicy, TimeoutConfig};
//! use ft_lifecycle::orchestration::LifecycleRunner;
//! use ft_lifecycle::state_machine::ConnectionState;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let host = |name: &str, workloads: Vec<WorkloadSnapshot>| HostSnapshot {
//!     name: name.to_string(),
//!     connection_state: ConnectionState::Connected,
//!     workloads,
//! };
//! let snapshot = InventorySnapshot {
//!     clusters: vec![ClusterSnapshot {
//!         name: "TestCluster".to_string(),
//!         protection_enabled: true,
//!         hosts: vec![host("esx-a", vec![WorkloadSnapshot::new("app-01")]), host("esx-b", vec![])],
//!     }],
//! };
//!
//! let runner = LifecycleRunner::new(
//!     Arc::new(SimulatedEndpoint::from_snapshot(&snapshot)),
//!     TimeoutConfig::default().without_delays(),
//!     LifecyclePolicy::default(),
//! );
//! let report = runner.run("TestCluster", Some("app-01")).await;
//! assert!(report.succeeded());
//! # }
//! ```

pub mod lifecycle;
pub mod rollback;
pub mod runner;
pub mod types;

pub use lifecycle::LifecycleOrchestrator;
pub use rollback::RollbackGuard;
pub use runner::LifecycleRunner;
pub use types::{
    FailureKind, LifecycleStep, RollbackAction, RollbackReport, RunContext, RunReport,
    SkipReason, StepOutcome, StepRecord,
};
