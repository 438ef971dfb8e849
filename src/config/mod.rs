//! # Lifecycle Configuration
//!
//! Connection, target and timing settings of one lifecycle run.
//!
//! ## Sources
//!
//! Layered by [`ConfigManager::load`], later layers winning:
//!
//! 1. Built-in defaults (every timing field, see [`crate::constants::timing`])
//! 2. An optional YAML/TOML/JSON file
//! 3. Environment variables `FT_LIFECYCLE__<SECTION>__<FIELD>`
//! 4. Command-line overrides
//!
//! ## Usage
//!
//! ```rust
//! use ft_lifecycle::config::{ConfigManager, ConfigOverrides};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let overrides = ConfigOverrides {
//!     address: Some("10.0.0.5".to_string()),
//!     username: Some("admin".to_string()),
//!     password: Some("secret".to_string()),
//!     cluster_name: Some("TestCluster".to_string()),
//!     workload_name: None,
//! };
//! let manager = ConfigManager::load(None, &overrides)?;
//! assert_eq!(manager.config().endpoint.url(), "https://10.0.0.5/sdk");
//! assert_eq!(manager.config().timeouts.task_timeout_seconds, 240);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::constants::{system, timing};
use crate::polling::PollSettings;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::{ConfigManager, ConfigOverrides};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub endpoint: EndpointConfig,
    pub target: TargetConfig,
    pub timeouts: TimeoutConfig,
    pub lifecycle: LifecyclePolicy,
}

/// Management endpoint connection settings
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub address: String,
    pub username: String,
    pub password: Option<String>,
}

impl EndpointConfig {
    pub fn url(&self) -> String {
        format!("https://{}{}", self.address, system::SDK_PATH)
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "******"))
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub cluster_name: String,
    /// When absent the first workload found on an eligible host is used
    pub workload_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub task_timeout_seconds: u64,
    pub disable_replica_timeout_seconds: u64,
    pub loop_delay_seconds: u64,
    pub poll_interval_ms: u64,
    pub settle_delay_ms: u64,
    pub exit_delay_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            task_timeout_seconds: timing::TASK_TIMEOUT_SECONDS,
            disable_replica_timeout_seconds: timing::DISABLE_REPLICA_TIMEOUT_SECONDS,
            loop_delay_seconds: timing::LOOP_DELAY_SECONDS,
            poll_interval_ms: timing::POLL_INTERVAL_MS,
            settle_delay_ms: timing::SETTLE_DELAY_MS,
            exit_delay_ms: timing::EXIT_DELAY_MS,
        }
    }
}

impl TimeoutConfig {
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_seconds)
    }

    pub fn disable_replica_timeout(&self) -> Duration {
        Duration::from_secs(self.disable_replica_timeout_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn exit_delay(&self) -> Duration {
        Duration::from_millis(self.exit_delay_ms)
    }

    /// Same budgets, no sleeping. For rehearsals and tests.
    pub fn without_delays(mut self) -> Self {
        self.poll_interval_ms = 0;
        self.settle_delay_ms = 0;
        self.exit_delay_ms = 0;
        self
    }
}

impl From<&TimeoutConfig> for PollSettings {
    fn from(timeouts: &TimeoutConfig) -> Self {
        PollSettings {
            loop_delay_seconds: timeouts.loop_delay_seconds,
            poll_interval: timeouts.poll_interval(),
            cancel: None,
        }
    }
}

/// Branching knobs of the orchestrator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecyclePolicy {
    /// Skip the promotion when re-enabling the replica did not re-protect the pair.
    /// Off by default: the promotion is attempted regardless.
    pub require_reprotection_before_promote: bool,
}

impl LifecycleConfig {
    /// Validate configuration consistency
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.endpoint.address.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "endpoint.address",
                "endpoint configuration",
            ));
        }

        if self.endpoint.username.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "endpoint.username",
                "endpoint configuration",
            ));
        }

        if self.endpoint.password.is_none() {
            return Err(ConfigurationError::missing_required_field(
                "endpoint.password",
                "endpoint configuration",
            ));
        }

        if self.target.cluster_name.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "target.cluster_name",
                "target configuration",
            ));
        }

        if self.timeouts.loop_delay_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "timeouts.loop_delay_seconds",
                "0",
                "loop delay must be greater than 0",
            ));
        }

        let timeouts = [
            ("timeouts.task_timeout_seconds", self.timeouts.task_timeout_seconds),
            (
                "timeouts.disable_replica_timeout_seconds",
                self.timeouts.disable_replica_timeout_seconds,
            ),
        ];
        for (field, value) in timeouts {
            if value == 0 {
                return Err(ConfigurationError::invalid_value(
                    field,
                    "0",
                    "timeout must be greater than 0",
                ));
            }
        }

        Ok(())
    }
}
