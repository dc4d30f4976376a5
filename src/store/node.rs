//! Replica definition and the version storage seam the coordinator talks to.
//!
//! A replica keeps, per key, the set of versions that survived the merge rule.
//! Each key's set sits behind its own mutex so the read-modify-write of a merge
//! is atomic per key, while writes to different keys never contend.

use std::future::Future;
use std::sync::Arc;

use crossbeam_skiplist::SkipMap;
use parking_lot::Mutex;
use tracing::trace;

use crate::store::error::ReplicaError;
use crate::store::types::{ReplicaId, VersionedValue};

/// Version storage operations a coordinator needs from a replica.
///
/// [`Replica`] implements this in-process and never fails. A transport-backed
/// implementation reports calls that did not complete as [`ReplicaError`]; the
/// coordinator counts them against the quorum instead of surfacing them.
pub trait VersionStore: Send + Sync + 'static {
    /// Identity used for placement on the ring.
    fn id(&self) -> &str;

    /// Merges `version` into the key's version set.
    fn apply_version(
        &self,
        key: &str,
        version: VersionedValue,
    ) -> impl Future<Output = Result<(), ReplicaError>> + Send;

    /// Snapshot of the key's version set (empty if never written).
    fn read_versions(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Vec<VersionedValue>, ReplicaError>> + Send;
}

/// What a merge did to a key's version set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The version was added; `superseded` older versions were dropped.
    Stored { superseded: usize },
    /// An identical version was already present.
    Duplicate,
}

type VersionSet = Arc<Mutex<Vec<VersionedValue>>>;

/// An in-process replica.
pub struct Replica {
    id: ReplicaId,
    versions: SkipMap<String, VersionSet>,
}

impl Replica {
    pub fn new(id: impl Into<ReplicaId>) -> Self {
        Replica {
            id: id.into(),
            versions: SkipMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Applies the merge rule for `incoming` against the key's stored versions.
    ///
    /// Stored versions dominated by `incoming` are dropped. Everything else is
    /// kept, and `incoming` is added unless an identical version is present.
    /// A write that is itself dominated by a stored version is still kept as a
    /// sibling; reads filter it out, so its value is never silently lost here.
    pub fn store_version(&self, key: &str, incoming: VersionedValue) -> ApplyOutcome {
        let entry = self
            .versions
            .get_or_insert_with(key.to_string(), || Arc::new(Mutex::new(Vec::new())));
        let mut set = entry.value().lock();

        let before = set.len();
        set.retain(|existing| !incoming.supersedes(existing));
        let superseded = before - set.len();

        let outcome = if set.contains(&incoming) {
            ApplyOutcome::Duplicate
        } else {
            set.push(incoming);
            ApplyOutcome::Stored { superseded }
        };

        trace!(replica = %self.id, key, ?outcome, versions = set.len(), "applied version");
        outcome
    }

    /// Current version set for `key`; empty if the key was never written here.
    pub fn versions(&self, key: &str) -> Vec<VersionedValue> {
        self.versions
            .get(key)
            .map(|entry| entry.value().lock().clone())
            .unwrap_or_default()
    }

    /// Number of versions currently held for `key`.
    pub fn version_count(&self, key: &str) -> usize {
        self.versions
            .get(key)
            .map(|entry| entry.value().lock().len())
            .unwrap_or(0)
    }

    /// Number of keys written at this replica.
    pub fn key_count(&self) -> usize {
        self.versions.len()
    }

    /// Keys written at this replica, in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.versions.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl VersionStore for Replica {
    fn id(&self) -> &str {
        &self.id
    }

    async fn apply_version(&self, key: &str, version: VersionedValue) -> Result<(), ReplicaError> {
        self.store_version(key, version);
        Ok(())
    }

    async fn read_versions(&self, key: &str) -> Result<Vec<VersionedValue>, ReplicaError> {
        Ok(self.versions(key))
    }
}

impl std::fmt::Debug for Replica {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Replica")
            .field("id", &self.id)
            .field("keys", &self.versions.len())
            .finish()
    }
}
