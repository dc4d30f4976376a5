//! Quorum coordination of reads and writes across replicas.
//!
//! This module contains the DistributedKvStore, which resolves the replicas for
//! a key on the placement ring, fans each request out to them as parallel tasks
//! and checks the collected acknowledgements against the configured quorums.
//!
//! # Write path
//!
//! The caller's base clock is advanced for the writing coordinator, the new
//! version is sent to every target replica and the acknowledgements are
//! counted against W. The returned clock is the causal context for the
//! caller's next write.
//!
//! # Read path
//!
//! Every target replica is queried, responses are counted against R and the
//! union of the returned versions is reduced to its non-dominated subset.
//! More than one surviving version means concurrent writes the caller must
//! resolve; the store never picks a winner beyond causality.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, warn};

use crate::store::config::StoreConfig;
use crate::store::error::StoreError;
use crate::store::node::{Replica, VersionStore};
use crate::store::ring::PlacementRing;
use crate::store::types::{VectorClock, VersionedValue};

/// Replication factor and quorum sizes in effect for a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumConfig {
    /// Replicas addressed per key (N, already clamped to the ring size).
    pub n: usize,
    /// Write quorum (W).
    pub w: usize,
    /// Read quorum (R).
    pub r: usize,
}

/// Coordinator for a fixed set of replicas.
///
/// Generic over the replica handle so a transport can stand in for the
/// in-process [`Replica`].
pub struct DistributedKvStore<S: VersionStore = Replica> {
    ring: PlacementRing,
    replicas: Vec<Arc<S>>,
    quorum: QuorumConfig,
}

impl DistributedKvStore<Replica> {
    /// Creates in-process replicas for every configured identity.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let replicas: Vec<Arc<Replica>> = config
            .replicas
            .iter()
            .map(|id| Arc::new(Replica::new(id.clone())))
            .collect();
        DistributedKvStore::with_replicas(
            replicas,
            config.replication_factor,
            config.write_quorum,
            config.read_quorum,
        )
    }
}

impl<S: VersionStore> DistributedKvStore<S> {
    /// Builds a store over caller-supplied replica handles.
    ///
    /// Identities are taken from [`VersionStore::id`] and validated the same
    /// way as a [`StoreConfig`].
    pub fn with_replicas(
        replicas: Vec<Arc<S>>,
        replication_factor: usize,
        write_quorum: usize,
        read_quorum: usize,
    ) -> Result<Self, StoreError> {
        let config = StoreConfig::new(
            replicas.iter().map(|replica| replica.id().to_string()),
            replication_factor,
            write_quorum,
            read_quorum,
        );
        config.validate()?;

        let ring = PlacementRing::new(config.replicas, replication_factor);
        let quorum = QuorumConfig {
            n: ring.replication_factor(),
            w: write_quorum,
            r: read_quorum,
        };
        debug!(replicas = ring.len(), n = quorum.n, w = quorum.w, r = quorum.r, "store created");

        Ok(DistributedKvStore {
            ring,
            replicas,
            quorum,
        })
    }

    pub fn ring(&self) -> &PlacementRing {
        &self.ring
    }

    pub fn quorum(&self) -> QuorumConfig {
        self.quorum
    }

    /// All replica handles, in membership order.
    pub fn replicas(&self) -> &[Arc<S>] {
        &self.replicas
    }

    /// Looks up a replica handle by identity.
    pub fn replica(&self, id: &str) -> Option<&Arc<S>> {
        self.replicas.iter().find(|replica| replica.id() == id)
    }

    /// Replica handles responsible for `key`, in ring order.
    fn targets(&self, key: &str) -> Vec<Arc<S>> {
        self.ring
            .resolve_slots(key)
            .into_iter()
            .map(|slot| Arc::clone(&self.replicas[slot]))
            .collect()
    }

    /// Writes `value` under `key` on behalf of `coordinator`.
    ///
    /// The new version's clock is `base_clock` (empty if `None`) with the
    /// coordinator's counter advanced by one. That clock is returned on
    /// success; pass it as the base of a later write to order the two, or
    /// merge it with another writer's clock to resolve a conflict.
    pub async fn put(
        &self,
        key: &str,
        value: impl Into<String>,
        coordinator: &str,
        base_clock: Option<VectorClock>,
    ) -> Result<VectorClock, StoreError> {
        let clock = base_clock.unwrap_or_default().increment(coordinator);
        let version = VersionedValue::new(value, clock.clone());

        let targets = self.targets(key);
        debug!(key, coordinator, targets = targets.len(), "put fan-out");

        let mut calls: FuturesUnordered<_> = targets
            .into_iter()
            .map(|replica| {
                let key = key.to_string();
                let version = version.clone();
                tokio::spawn(async move {
                    let result = replica.apply_version(&key, version).await;
                    (replica, result)
                })
            })
            .collect();

        let mut acks = 0;
        while let Some(joined) = calls.next().await {
            match joined {
                Ok((_, Ok(()))) => acks += 1,
                Ok((replica, Err(e))) => {
                    warn!(key, replica = replica.id(), error = %e, "replica write failed");
                }
                Err(e) => warn!(key, error = %e, "replica write task failed"),
            }
        }

        if acks < self.quorum.w {
            warn!(key, acks, required = self.quorum.w, "write quorum not met");
            return Err(StoreError::WriteQuorumNotMet {
                acks,
                required: self.quorum.w,
            });
        }

        debug!(key, acks, "put committed");
        Ok(clock)
    }

    /// Reads every surviving version of `key`.
    ///
    /// An empty result means no contacted replica holds the key. Stops
    /// waiting as soon as R can no longer be reached.
    pub async fn get(&self, key: &str) -> Result<Vec<VersionedValue>, StoreError> {
        let targets = self.targets(key);
        debug!(key, targets = targets.len(), "get fan-out");

        let mut calls: FuturesUnordered<_> = targets
            .into_iter()
            .map(|replica| {
                let key = key.to_string();
                tokio::spawn(async move {
                    let result = replica.read_versions(&key).await;
                    (replica, result)
                })
            })
            .collect();

        let required = self.quorum.r;
        let mut responses = 0;
        let mut collected = Vec::new();

        while let Some(joined) = calls.next().await {
            match joined {
                Ok((_, Ok(versions))) => {
                    responses += 1;
                    collected.extend(versions);
                    continue;
                }
                Ok((replica, Err(e))) => {
                    warn!(key, replica = replica.id(), error = %e, "replica read failed");
                }
                Err(e) => warn!(key, error = %e, "replica read task failed"),
            }
            // Outstanding calls are dropped, not aborted, once R is out of reach.
            if responses + calls.len() < required {
                break;
            }
        }

        if responses < required {
            warn!(key, responses, required, "read quorum not met");
            return Err(StoreError::ReadQuorumNotMet {
                responses,
                required,
            });
        }

        let versions = reconcile(collected);
        debug!(key, responses, versions = versions.len(), "get reconciled");
        Ok(versions)
    }
}

impl<S: VersionStore> std::fmt::Debug for DistributedKvStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistributedKvStore")
            .field("members", &self.ring.members())
            .field("quorum", &self.quorum)
            .finish_non_exhaustive()
    }
}

/// Reduces versions gathered from several replicas to the concurrent frontier.
///
/// Structurally identical versions are collapsed, then every version that
/// another candidate dominates is dropped. First-seen order is kept.
pub fn reconcile(versions: impl IntoIterator<Item = VersionedValue>) -> Vec<VersionedValue> {
    let mut seen = HashSet::new();
    let unique: Vec<VersionedValue> = versions
        .into_iter()
        .filter(|version| seen.insert(version.clone()))
        .collect();

    unique
        .iter()
        .filter(|candidate| !unique.iter().any(|other| other.supersedes(candidate)))
        .cloned()
        .collect()
}
