//! Replica identifier type.
//!
//! This module contains the definition of ReplicaId, which names each
//! participant in the store: the replicas on the ring and the coordinators
//! whose writes advance vector clocks.

/// A unique identifier for a replica or a writing coordinator.
///
/// Replica identities are hashed onto the placement ring and double as the
/// participant keys of vector clocks, so they must be stable across runs.
pub type ReplicaId = String;
