//! Construction-time configuration for a [`DistributedKvStore`].
//!
//! [`DistributedKvStore`]: crate::store::DistributedKvStore

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::store::error::ConfigError;
use crate::store::types::ReplicaId;

/// Replica membership and quorum settings, fixed for the life of a store.
///
/// Missing fields fall back to a three replica cluster with N=3, W=2, R=2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Distinct replica identities placed on the ring.
    pub replicas: Vec<ReplicaId>,
    /// Replicas addressed per key (N). Clamped to the replica count.
    pub replication_factor: usize,
    /// Acknowledgements required for a write to succeed (W).
    pub write_quorum: usize,
    /// Responses required for a read to succeed (R).
    pub read_quorum: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            replicas: vec!["s1".into(), "s2".into(), "s3".into()],
            replication_factor: 3,
            write_quorum: 2,
            read_quorum: 2,
        }
    }
}

impl StoreConfig {
    pub fn new<I, S>(
        replicas: I,
        replication_factor: usize,
        write_quorum: usize,
        read_quorum: usize,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ReplicaId>,
    {
        StoreConfig {
            replicas: replicas.into_iter().map(Into::into).collect(),
            replication_factor,
            write_quorum,
            read_quorum,
        }
    }

    /// Parses a JSON document; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Checks membership and replication factor.
    ///
    /// Quorums are deliberately not checked against the replica count: a
    /// W or R that cannot be met surfaces as a quorum error per request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.replicas.is_empty() {
            return Err(ConfigError::EmptyReplicaSet);
        }
        if self.replication_factor < 1 {
            return Err(ConfigError::InvalidReplicationFactor(
                self.replication_factor,
            ));
        }
        let mut seen = HashSet::new();
        for id in &self.replicas {
            if !seen.insert(id.as_str()) {
                return Err(ConfigError::DuplicateReplica(id.clone()));
            }
        }
        Ok(())
    }

    /// Replication factor after clamping to the replica count.
    pub fn effective_replication_factor(&self) -> usize {
        self.replication_factor.min(self.replicas.len())
    }
}
