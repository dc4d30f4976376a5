//! Versioned values: a stored value tagged with the clock of the write that produced it.

use serde::{Deserialize, Serialize};

use crate::store::types::clock::VectorClock;

/// An immutable value paired with its vector clock.
///
/// Equality and hashing are structural (same value, same clock entries), which
/// makes re-applying an identical version idempotent and lets versions from
/// different replicas be de-duplicated as set elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionedValue {
    value: String,
    clock: VectorClock,
}

impl VersionedValue {
    pub fn new(value: impl Into<String>, clock: VectorClock) -> Self {
        VersionedValue {
            value: value.into(),
            clock,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn clock(&self) -> &VectorClock {
        &self.clock
    }

    pub fn into_parts(self) -> (String, VectorClock) {
        (self.value, self.clock)
    }

    /// True if this version causally supersedes `other`.
    pub fn supersedes(&self, other: &VersionedValue) -> bool {
        self.clock.dominates(&other.clock)
    }
}

/// Element-wise maximum over the clocks of `versions`.
///
/// Passing the result as the base clock of the next write makes that write
/// dominate every version in `versions`, which is how a client resolves a
/// conflict it has observed.
pub fn merged_clock(versions: &[VersionedValue]) -> VectorClock {
    versions
        .iter()
        .fold(VectorClock::new(), |acc, version| acc.merge(version.clock()))
}
