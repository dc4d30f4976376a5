//! Consistent-hash placement of keys onto replicas.
//!
//! Every replica identity is hashed to a position on a circular `u64` space.
//! A key is served by the first replica at or after the key's own position,
//! followed by the next distinct replicas walking clockwise until N are found.
//! The mapping depends only on the membership list and the key, so a PUT and
//! a later GET for the same key always address the same replicas.

use sha2::{Digest, Sha256};

use crate::store::types::ReplicaId;

/// Hashes a replica identity or key onto the ring.
///
/// First eight bytes of SHA-256, big-endian. Stable across runs and platforms.
pub fn ring_hash(input: &str) -> u64 {
    let digest = Sha256::digest(input.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

/// A single point on the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RingEntry {
    position: u64,
    /// Index into `PlacementRing::members`.
    slot: usize,
}

/// Sorted ring over a fixed replica membership.
#[derive(Debug, Clone)]
pub struct PlacementRing {
    members: Vec<ReplicaId>,
    entries: Vec<RingEntry>,
    replication_factor: usize,
}

impl PlacementRing {
    /// Builds the ring. `replication_factor` is clamped to the member count.
    ///
    /// Callers are expected to have validated membership (non-empty, distinct);
    /// see [`StoreConfig::validate`](crate::store::StoreConfig::validate).
    pub fn new(members: Vec<ReplicaId>, replication_factor: usize) -> Self {
        let mut entries: Vec<RingEntry> = members
            .iter()
            .enumerate()
            .map(|(slot, id)| RingEntry {
                position: ring_hash(id),
                slot,
            })
            .collect();
        // Stable sort: equal hashes keep membership order.
        entries.sort_by_key(|entry| entry.position);

        PlacementRing {
            replication_factor: replication_factor.min(members.len()),
            members,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of replicas returned for every key (N after clamping).
    pub fn replication_factor(&self) -> usize {
        self.replication_factor
    }

    /// Replica identities in membership order.
    pub fn members(&self) -> &[ReplicaId] {
        &self.members
    }

    /// Ring position of a member, if it belongs to this ring.
    pub fn position(&self, id: &str) -> Option<u64> {
        self.members
            .iter()
            .any(|member| member == id)
            .then(|| ring_hash(id))
    }

    /// Ordered replica identities responsible for `key`.
    pub fn resolve(&self, key: &str) -> Vec<ReplicaId> {
        self.resolve_slots(key)
            .into_iter()
            .map(|slot| self.members[slot].clone())
            .collect()
    }

    /// Same as [`resolve`](Self::resolve), as indices into [`members`](Self::members).
    pub fn resolve_slots(&self, key: &str) -> Vec<usize> {
        if self.entries.is_empty() {
            return Vec::new();
        }

        let key_hash = ring_hash(key);
        // First entry whose position is >= the key hash; wrap past the end.
        let start = self
            .entries
            .partition_point(|entry| entry.position < key_hash)
            % self.entries.len();

        let mut slots = Vec::with_capacity(self.replication_factor);
        for offset in 0..self.entries.len() {
            if slots.len() == self.replication_factor {
                break;
            }
            let slot = self.entries[(start + offset) % self.entries.len()].slot;
            if !slots.contains(&slot) {
                slots.push(slot);
            }
        }
        slots
    }
}
