//! Type definitions for the replicated store.
//!
//! This module contains the causality primitives used throughout the store,
//! organized into focused submodules.

pub mod clock;
pub mod replica;
pub mod versioned;

pub use clock::{ClockOrdering, VectorClock};
pub use replica::ReplicaId;
pub use versioned::{VersionedValue, merged_clock};
