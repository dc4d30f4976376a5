//! # Quorum KV - coordination core of a replicated key-value store
//!
//! Keys are placed on replicas with consistent hashing, written and read with
//! configurable quorums, and versioned with vector clocks so that concurrent
//! writes are detected and kept side by side instead of overwritten.
//!
//! ## Features
//!
//! - **Deterministic placement**: a SHA-256 hash ring maps every key to the same N replicas
//! - **Quorum coordination**: writes need W acknowledgements, reads need R responses
//! - **Causality tracking**: vector clocks decide which versions supersede which
//! - **Conflict exposure**: concurrent writes come back as siblings for the caller to merge
//!
//! ## Example
//!
//! ```rust
//! use quorum_kv::{DistributedKvStore, StoreConfig};
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(async {
//!     let kv = DistributedKvStore::new(StoreConfig::new(["s1", "s2", "s3"], 3, 2, 2)).unwrap();
//!     kv.put("user:1", "alice", "s1", None).await.unwrap();
//!
//!     let versions = kv.get("user:1").await.unwrap();
//!     assert_eq!(versions.len(), 1);
//!     assert_eq!(versions[0].value(), "alice");
//! });
//! ```

pub mod store;

// Re-export the main public API from the store module
pub use store::{ClockOrdering, ReplicaId, VectorClock, VersionedValue, merged_clock};
pub use store::{ConfigError, ReplicaError, StoreError};
pub use store::{
    DistributedKvStore, PlacementRing, QuorumConfig, Replica, StoreConfig, VersionStore,
};
