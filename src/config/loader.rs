//! Configuration Loader
//!
//! Merges the configuration layers with the `config` crate, validates the
//! result and logs a masked view of it.

use config::{Config, Environment, File};
use std::env;
use std::path::Path;
use tracing::{debug, info};

use super::error::{ConfigResult, ConfigurationError};
use super::LifecycleConfig;
use crate::constants::system::ENV_PREFIX;

/// Values given on the command line; `None` leaves lower layers untouched
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub address: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub cluster_name: Option<String>,
    pub workload_name: Option<String>,
}

pub struct ConfigManager {
    config: LifecycleConfig,
    environment: String,
}

impl ConfigManager {
    /// Load, merge and validate the configuration
    pub fn load(file: Option<&Path>, overrides: &ConfigOverrides) -> ConfigResult<ConfigManager> {
        let environment = Self::detect_environment();
        let config = Self::merge_sources(file, overrides)?;

        config.validate()?;

        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string_pretty(&Self::sanitize_config_for_logging(&config))
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );
        info!(
            environment = %environment,
            endpoint = %config.endpoint.url(),
            cluster = %config.target.cluster_name,
            workload = config.target.workload_name.as_deref().unwrap_or("<first available>"),
            "⚙️ CONFIG: configuration loaded"
        );

        Ok(ConfigManager {
            config,
            environment,
        })
    }

    /// Wrap an already built configuration, validating it
    pub fn from_config(config: LifecycleConfig) -> ConfigResult<ConfigManager> {
        config.validate()?;
        Ok(ConfigManager {
            config,
            environment: Self::detect_environment(),
        })
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn into_config(self) -> LifecycleConfig {
        self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Configuration as JSON with credentials masked
    pub fn debug_config(&self) -> serde_json::Value {
        Self::sanitize_config_for_logging(&self.config)
    }

    fn merge_sources(
        file: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> ConfigResult<LifecycleConfig> {
        let mut builder = Config::builder();

        if let Some(path) = file {
            if !path.is_file() {
                return Err(ConfigurationError::file_read_error(
                    path.display().to_string(),
                    "configuration path must point to a regular file",
                ));
            }
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        );

        let cli_layer = [
            ("endpoint.address", &overrides.address),
            ("endpoint.username", &overrides.username),
            ("endpoint.password", &overrides.password),
            ("target.cluster_name", &overrides.cluster_name),
            ("target.workload_name", &overrides.workload_name),
        ];
        for (key, value) in cli_layer {
            builder = builder.set_override_option(key, value.clone())?;
        }

        Ok(builder.build()?.try_deserialize::<LifecycleConfig>()?)
    }

    /// Detect current environment from environment variables
    fn detect_environment() -> String {
        env::var("FT_LIFECYCLE_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn sanitize_config_for_logging(config: &LifecycleConfig) -> serde_json::Value {
        let mut config_json = serde_json::json!(config);
        let sensitive_patterns = ["password", "secret", "token", "credential"];
        Self::sanitize_json_recursive(&mut config_json, &sensitive_patterns);
        config_json
    }

    fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let is_sensitive = sensitive_patterns
                        .iter()
                        .any(|pattern| key_lower.contains(pattern));

                    if !is_sensitive {
                        Self::sanitize_json_recursive(val, sensitive_patterns);
                        continue;
                    }

                    *val = match val {
                        serde_json::Value::Null => serde_json::Value::Null,
                        serde_json::Value::String(s) if s.is_empty() => {
                            serde_json::Value::String("[EMPTY]".to_string())
                        }
                        _ => serde_json::Value::String("[MASKED]".to_string()),
                    };
                }
            }
            serde_json::Value::Array(arr) => {
                for item in arr.iter_mut() {
                    Self::sanitize_json_recursive(item, sensitive_patterns);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn cli() -> ConfigOverrides {
        ConfigOverrides {
            address: Some("10.0.0.5".to_string()),
            username: Some("admin".to_string()),
            password: Some("s3cr3t-pass".to_string()),
            cluster_name: Some("TestCluster".to_string()),
            workload_name: None,
        }
    }

    fn yaml_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_overrides_only() {
        let manager = ConfigManager::load(None, &cli()).unwrap();
        let config = manager.config();
        assert_eq!(config.endpoint.url(), "https://10.0.0.5/sdk");
        assert_eq!(config.target.workload_name, None);
        assert_eq!(config.timeouts.disable_replica_timeout_seconds, 120);
    }

    #[test]
    fn test_file_layer_below_overrides() {
        let file = yaml_file(
            r#"
endpoint:
  address: "192.168.1.10"
  username: "root"
target:
  cluster_name: "FromFile"
  workload_name: "app-01"
timeouts:
  task_timeout_seconds: 60
lifecycle:
  require_reprotection_before_promote: true
"#,
        );
        let overrides = ConfigOverrides {
            password: Some("pw".to_string()),
            cluster_name: Some("FromCli".to_string()),
            ..ConfigOverrides::default()
        };

        let manager = ConfigManager::load(Some(file.path()), &overrides).unwrap();
        let config = manager.config();
        assert_eq!(config.endpoint.address, "192.168.1.10");
        assert_eq!(config.target.cluster_name, "FromCli");
        assert_eq!(config.target.workload_name.as_deref(), Some("app-01"));
        assert_eq!(config.timeouts.task_timeout_seconds, 60);
        assert_eq!(config.timeouts.loop_delay_seconds, 5);
        assert!(config.lifecycle.require_reprotection_before_promote);
    }

    #[test]
    fn test_missing_file_is_rejected() {
        let err = ConfigManager::load(Some(Path::new("/nonexistent/ft.yaml")), &cli())
            .err()
            .unwrap();
        assert!(matches!(err, ConfigurationError::FileRead { .. }));
    }

    #[test]
    fn test_validation_runs_after_merge() {
        let overrides = ConfigOverrides {
            password: None,
            ..cli()
        };
        assert!(matches!(
            ConfigManager::load(None, &overrides),
            Err(ConfigurationError::MissingRequiredField { .. })
        ));
    }

    #[test]
    fn test_config_sanitization() {
        let manager = ConfigManager::load(None, &cli()).unwrap();
        let sanitized = manager.debug_config();
        assert_eq!(sanitized["endpoint"]["password"], "[MASKED]");
        assert_eq!(sanitized["endpoint"]["username"], "admin");
        assert!(!sanitized.to_string().contains("s3cr3t-pass"));
    }
}
