//! Error types for the protection lifecycle.

use thiserror::Error;

use crate::client::RemoteError;
use crate::config::ConfigurationError;
use crate::topology::ResolutionError;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Topology resolution error: {0}")]
    Resolution(#[from] ResolutionError),
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
    #[error("Inventory snapshot error: {0}")]
    Snapshot(String),
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
