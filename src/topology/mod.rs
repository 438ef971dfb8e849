//! # Topology Resolution
//!
//! Turns a cluster name and an optional workload name into a validated
//! [`Topology`](crate::models::Topology): a protection-enabled cluster with at
//! least two connected hosts, the primary workload, its host and the secondary
//! host the replica will be placed on.
//!
//! ```rust
//! use std::sync::Arc;
//! use ft_lifecycle::client::{ClusterSnapshot, HostSnapshot, InventorySnapshot, SimulatedEndpoint};
//! use ft_lifecycle::state_machine::ConnectionState;
//! use ft_lifecycle::topology::{ResolutionError, TopologyResolver};
//!
//! let snapshot = InventorySnapshot {
//!     clusters: vec![ClusterSnapshot {
//!         name: "TestCluster".to_string(),
//!         protection_enabled: true,
//!         hosts: vec![HostSnapshot {
//!             name: "esx-a".to_string(),
//!             connection_state: ConnectionState::Connected,
//!             workloads: vec![],
//!         }],
//!     }],
//! };
//! let resolver = TopologyResolver::new(Arc::new(SimulatedEndpoint::from_snapshot(&snapshot)));
//!
//! # tokio_test::block_on(async {
//! let err = resolver.resolve("TestCluster", None).await.unwrap_err();
//! assert!(matches!(err, ResolutionError::InsufficientHosts { connected: 1, .. }));
//! # });
//! ```

pub mod resolver;

pub use resolver::{ResolutionError, TopologyResolver};
