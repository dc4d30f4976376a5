//! Error types for store construction, replica calls and quorum coordination.

use thiserror::Error;

use crate::store::types::ReplicaId;

/// Invalid construction-time configuration. Never recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("at least one replica is required")]
    EmptyReplicaSet,
    #[error("replication factor must be >= 1, got {0}")]
    InvalidReplicationFactor(usize),
    #[error("replica `{0}` is listed more than once")]
    DuplicateReplica(ReplicaId),
}

/// A single replica call that did not complete.
///
/// The in-process [`Replica`](crate::store::Replica) never produces this; it
/// exists for transports that sit behind [`VersionStore`](crate::store::VersionStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicaError {
    #[error("replica `{replica}` unavailable: {reason}")]
    Unavailable { replica: ReplicaId, reason: String },
}

/// Errors surfaced by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("write quorum not met: acks={acks}, W={required}")]
    WriteQuorumNotMet { acks: usize, required: usize },
    #[error("read quorum not met: responses={responses}, R={required}")]
    ReadQuorumNotMet { responses: usize, required: usize },
}

impl StoreError {
    /// How many more replicas would have been needed to reach the quorum.
    pub fn shortfall(&self) -> Option<usize> {
        match self {
            StoreError::WriteQuorumNotMet { acks, required } => {
                Some(required.saturating_sub(*acks))
            }
            StoreError::ReadQuorumNotMet {
                responses,
                required,
            } => Some(required.saturating_sub(*responses)),
            StoreError::Config(_) => None,
        }
    }
}
