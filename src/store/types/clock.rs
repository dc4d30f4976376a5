//! Vector clock implementation for causal versioning.
//!
//! This module contains the VectorClock struct which tracks, per participant,
//! how many of that participant's writes a version has incorporated. Clocks
//! are compared through dominance (happened-before), never a total order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::types::replica::ReplicaId;

/// Result of comparing two vector clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockOrdering {
    /// Every participant counter matches (absent entries count as 0).
    Equal,
    /// `self` is causally later than `other`.
    Dominates,
    /// `other` is causally later than `self`.
    DominatedBy,
    /// Neither clock dominates the other: the versions conflict.
    Concurrent,
}

/// A vector clock: maps participant identifiers to monotonic counters.
///
/// Entries are kept in a sorted map so that a clock snapshot has a single
/// canonical form and can be hashed as part of a [`VersionedValue`].
///
/// [`VersionedValue`]: crate::store::types::VersionedValue
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorClock {
    entries: BTreeMap<ReplicaId, u64>,
}

impl VectorClock {
    /// Creates an empty clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a clock from `(participant, counter)` pairs.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<ReplicaId>,
    {
        VectorClock {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Gets the counter for a participant (0 if absent).
    pub fn get(&self, participant: &str) -> u64 {
        self.entries.get(participant).copied().unwrap_or(0)
    }

    /// Returns the raw entries in participant order.
    pub fn entries(&self) -> &BTreeMap<ReplicaId, u64> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a copy of this clock with `participant`'s counter advanced by one.
    pub fn increment(&self, participant: &str) -> Self {
        let mut next = self.clone();
        *next.entries.entry(participant.to_string()).or_insert(0) += 1;
        next
    }

    /// Element-wise maximum of two clocks.
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.entries.clone();
        for (participant, &counter) in &other.entries {
            let entry = merged.entry(participant.clone()).or_insert(0);
            *entry = (*entry).max(counter);
        }
        VectorClock { entries: merged }
    }

    /// Compares two clocks over the union of their participants.
    pub fn compare(&self, other: &Self) -> ClockOrdering {
        let mut self_ahead = false;
        let mut other_ahead = false;

        let participants = self.entries.keys().chain(other.entries.keys());
        for participant in participants {
            let mine = self.get(participant);
            let theirs = other.get(participant);
            if mine > theirs {
                self_ahead = true;
            } else if theirs > mine {
                other_ahead = true;
            }
            if self_ahead && other_ahead {
                return ClockOrdering::Concurrent;
            }
        }

        match (self_ahead, other_ahead) {
            (false, false) => ClockOrdering::Equal,
            (true, false) => ClockOrdering::Dominates,
            (false, true) => ClockOrdering::DominatedBy,
            (true, true) => ClockOrdering::Concurrent,
        }
    }

    /// True iff `self >= other` for every participant and `>` for at least one.
    pub fn dominates(&self, other: &Self) -> bool {
        self.compare(other) == ClockOrdering::Dominates
    }

    /// True iff neither clock dominates the other and they are not equal.
    pub fn is_concurrent(&self, other: &Self) -> bool {
        self.compare(other) == ClockOrdering::Concurrent
    }
}

impl<K: Into<ReplicaId>> FromIterator<(K, u64)> for VectorClock {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        VectorClock::from_entries(iter)
    }
}
