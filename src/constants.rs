//! # System Constants
//!
//! Core constants that define the operational boundaries of
//! the protection lifecycle: per-step timeouts, the polling cadence, rollback
//! settle pauses and the process exit codes reported by the launcher.

/// Lifecycle log events, used as the `event` field of structured log lines
pub mod events {
    pub const RESOLUTION_STARTED: &str = "topology.resolution_started";
    pub const RESOLUTION_COMPLETED: &str = "topology.resolution_completed";
    pub const RESOLUTION_FAILED: &str = "topology.resolution_failed";

    pub const STEP_STARTED: &str = "lifecycle.step_started";
    pub const STEP_SUCCEEDED: &str = "lifecycle.step_succeeded";
    pub const STEP_FAILED: &str = "lifecycle.step_failed";
    pub const STEP_SKIPPED: &str = "lifecycle.step_skipped";

    pub const ROLLBACK_STARTED: &str = "rollback.started";
    pub const ROLLBACK_COMPLETED: &str = "rollback.completed";
}

/// Polling and timeout defaults
pub mod timing {
    /// Timeout for every remote operation except disable-replica
    pub const TASK_TIMEOUT_SECONDS: u64 = 240;

    /// Timeout for the disable-replica operation
    pub const DISABLE_REPLICA_TIMEOUT_SECONDS: u64 = 120;

    /// Budget divisor: a wait of `T` seconds is allotted `T / LOOP_DELAY_SECONDS` observations
    pub const LOOP_DELAY_SECONDS: u64 = 5;

    /// Sleep between two non-terminal observations
    pub const POLL_INTERVAL_MS: u64 = 2_000;

    /// Pause the rollback guard takes before acting and after a power-off
    pub const SETTLE_DELAY_MS: u64 = 5_000;

    /// Final pause of the launcher before printing the end banner
    pub const EXIT_DELAY_MS: u64 = 2_000;
}

/// System-wide constants
pub mod system {
    /// Version compatibility marker
    pub const FT_LIFECYCLE_VERSION: &str = env!("CARGO_PKG_VERSION");

    /// A protected workload needs a primary and a secondary host
    pub const MIN_CONNECTED_HOSTS: usize = 2;

    /// Path appended to the endpoint address to build the management URL
    pub const SDK_PATH: &str = "/sdk";

    /// Prefix of environment variables read by the configuration loader
    pub const ENV_PREFIX: &str = "FT_LIFECYCLE";
}

/// Process exit codes reported by the launcher
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const CONFIGURATION_ERROR: i32 = 2;
    pub const RESOLUTION_FAILED: i32 = 3;
    pub const STEP_FAILED: i32 = 4;
    pub const ROLLBACK_INCOMPLETE: i32 = 5;
}
