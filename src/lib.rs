#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # FT Lifecycle
//!
//! Orchestration of a fault-tolerance protection lifecycle on a virtualized
//! workload: attach a protective replica, exercise a failover by promoting it,
//! then tear the protection down and restore the workload.
//!
//! ## Architecture
//!
//! The remote management endpoint is a collaborator behind the traits of
//! [`client`]. On top of it:
//!
//! - [`topology`] resolves the cluster, its connected hosts and the workload
//! - [`polling`] waits on long-running operations and on protection state
//! - [`orchestration`] drives the step sequence, records every outcome and
//!   always runs the rollback guard last
//!
//! ## Module Organization
//!
//! - [`client`] - Collaborator traits and the in-memory simulated endpoint
//! - [`config`] - Layered configuration loading and validation
//! - [`constants`] - Timeouts, polling cadence and exit codes
//! - [`error`] - Crate-level error type
//! - [`logging`] - Console logging and step narration helpers
//! - [`models`] - Inventory objects and operation handles
//! - [`orchestration`] - Orchestrator, rollback guard, runner and run report
//! - [`polling`] - Task monitor and protection-state waiter
//! - [`state_machine`] - Operation, protection, power and connection states
//! - [`topology`] - Topology resolution and its precondition errors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use ft_lifecycle::client::SimulatedEndpoint;
//! use ft_lifecycle::config::{ConfigManager, ConfigOverrides};
//! use ft_lifecycle::orchestration::LifecycleRunner;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load(Some(Path::new("ft-lifecycle.yaml")), &ConfigOverrides::default())?;
//! let endpoint = Arc::new(SimulatedEndpoint::load_snapshot(Path::new("inventory.json"))?);
//!
//! let runner = LifecycleRunner::from_config(endpoint, manager.config());
//! let report = runner.run_target(&manager.config().target).await;
//! std::process::exit(report.exit_code());
//! # }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod polling;
pub mod state_machine;
pub mod topology;

pub use client::{InventoryDirectory, ManagementClient, OperationApi, RemoteError, WorkloadApi};
pub use config::{ConfigManager, ConfigurationError, LifecycleConfig};
pub use constants::{exit_codes, system, timing};
pub use error::{LifecycleError, Result};
pub use models::{ClusterCandidate, HostCandidate, OperationHandle, ReplicaRef, Topology, WorkloadRef};
pub use orchestration::{LifecycleOrchestrator, LifecycleRunner, RollbackGuard, RunReport};
pub use polling::{PollOutcome, StateWaiter, TaskMonitor};
pub use state_machine::{ConnectionState, OperationState, PowerState, ProtectionState};
pub use topology::{ResolutionError, TopologyResolver};
