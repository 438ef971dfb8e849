//! # Management Endpoint Client
//!
//! The seam between the lifecycle core and the remote management endpoint.
//!
//! ## Architecture
//!
//! - **InventoryDirectory**: cluster, host and workload enumeration
//! - **WorkloadApi**: long-running mutations and state queries on a workload
//! - **OperationApi**: state of a long-running operation
//! - **ManagementClient**: umbrella trait the orchestrator is generic over
//! - **SimulatedEndpoint**: in-memory adapter for rehearsals and tests
//!
//! ## Usage
//!
//! ```rust
//! use ft_lifecycle::client::{InventorySnapshot, SimulatedEndpoint, InventoryDirectory};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let endpoint = SimulatedEndpoint::from_snapshot(&InventorySnapshot::default());
//! let clusters = endpoint.list_clusters().await?;
//! assert!(clusters.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod simulated;
pub mod traits;

pub use errors::{RemoteError, RemoteResult};
pub use simulated::{
    CallRecord, ClusterSnapshot, FaultPoint, HostSnapshot, InventorySnapshot, SimulatedEndpoint,
    WorkloadSnapshot,
};
pub use traits::{InventoryDirectory, ManagementClient, OperationApi, WorkloadApi};
