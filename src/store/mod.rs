//! Replicated key-value store core.
//!
//! This module contains consistent-hash placement, the per-replica
//! multi-version store and the quorum coordinator built on top of both.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod node;
pub mod ring;
pub mod types;

// Re-export the main public API
pub use config::StoreConfig;
pub use coordinator::{DistributedKvStore, QuorumConfig, reconcile};
pub use error::{ConfigError, ReplicaError, StoreError};
pub use node::{ApplyOutcome, Replica, VersionStore};
pub use ring::{PlacementRing, ring_hash};
pub use types::{ClockOrdering, ReplicaId, VectorClock, VersionedValue, merged_clock};
