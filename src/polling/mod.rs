//! # Polling
//!
//! Budgeted waits on remote state.
//!
//! - [`TaskMonitor`]: waits for a long-running operation to reach `success` or `error`
//! - [`StateWaiter`]: waits for a workload's protection state to satisfy a guard
//!
//! Both share [`poll_until`] and therefore the same budget arithmetic:
//! `timeout / loop_delay` observations, one `poll_interval` pause after each
//! non-terminal one.

pub mod poller;
pub mod state_waiter;
pub mod task_monitor;

pub use poller::{
    poll_until, CancelHandle, CancelSignal, PollBudget, PollOutcome, PollSettings, PollStep,
};
pub use state_waiter::StateWaiter;
pub use task_monitor::TaskMonitor;
