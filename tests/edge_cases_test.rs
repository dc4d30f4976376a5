//! Edge case tests for the quorum KV store.
//!
//! These tests plug failing replicas in behind the VersionStore trait, hammer
//! the store from many tasks at once and exercise boundary configurations.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use quorum_kv::{
    DistributedKvStore, Replica, ReplicaError, StoreConfig, StoreError, VectorClock, VersionStore,
    VersionedValue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Health {
    Up,
    /// Every call fails immediately.
    Down,
    /// Every call hangs forever, like a peer that accepted the connection and went silent.
    Stalled,
}

/// An in-process replica whose transport can be broken to order.
struct FlakyReplica {
    inner: Replica,
    health: Health,
    calls: AtomicUsize,
}

impl FlakyReplica {
    fn with_health(id: &str, health: Health) -> Arc<Self> {
        Arc::new(FlakyReplica {
            inner: Replica::new(id),
            health,
            calls: AtomicUsize::new(0),
        })
    }

    fn up(id: &str) -> Arc<Self> {
        Self::with_health(id, Health::Up)
    }

    fn down(id: &str) -> Arc<Self> {
        Self::with_health(id, Health::Down)
    }

    async fn check(&self) -> Result<(), ReplicaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.health {
            Health::Up => Ok(()),
            Health::Down => Err(ReplicaError::Unavailable {
                replica: self.inner.id().to_string(),
                reason: "connection refused".to_string(),
            }),
            Health::Stalled => std::future::pending().await,
        }
    }
}

impl VersionStore for FlakyReplica {
    fn id(&self) -> &str {
        self.inner.id()
    }

    async fn apply_version(&self, key: &str, version: VersionedValue) -> Result<(), ReplicaError> {
        self.check().await?;
        self.inner.store_version(key, version);
        Ok(())
    }

    async fn read_versions(&self, key: &str) -> Result<Vec<VersionedValue>, ReplicaError> {
        self.check().await?;
        Ok(self.inner.versions(key))
    }
}

/// Three replicas s1/s2/s3 with N=3; the ids in `down` fail every call.
fn flaky_store(down: &[&str], w: usize, r: usize) -> DistributedKvStore<FlakyReplica> {
    let replicas = ["s1", "s2", "s3"]
        .into_iter()
        .map(|id| {
            if down.contains(&id) {
                FlakyReplica::down(id)
            } else {
                FlakyReplica::up(id)
            }
        })
        .collect();
    DistributedKvStore::with_replicas(replicas, 3, w, r).unwrap()
}

#[tokio::test]
async fn test_write_succeeds_with_one_replica_down() {
    let kv = flaky_store(&["s2"], 2, 2);

    kv.put("user:1", "alice", "s1", None).await.unwrap();
    let versions = kv.get("user:1").await.unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].value(), "alice");

    let dead = kv.replica("s2").unwrap();
    assert!(dead.inner.versions("user:1").is_empty());
}

#[tokio::test]
async fn test_failed_replicas_trigger_write_quorum_error() {
    let kv = flaky_store(&["s1", "s2"], 2, 1);

    let err = kv.put("k", "v", "s1", None).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::WriteQuorumNotMet {
            acks: 1,
            required: 2
        }
    );

    // The surviving replica still applied the write.
    let survivor = kv.replica("s3").unwrap();
    assert_eq!(survivor.inner.versions("k").len(), 1);
}

#[tokio::test]
async fn test_failed_replicas_trigger_read_quorum_error() {
    let kv = flaky_store(&["s1", "s3"], 1, 2);

    let err = kv.get("k").await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::ReadQuorumNotMet {
            required: 2,
            responses
        } if responses <= 1
    ));
}

#[tokio::test]
async fn test_get_gives_up_on_stalled_replica_once_quorum_is_unreachable() {
    let replicas = vec![
        FlakyReplica::down("s1"),
        FlakyReplica::down("s2"),
        FlakyReplica::with_health("s3", Health::Stalled),
    ];
    let kv = DistributedKvStore::with_replicas(replicas, 3, 1, 2).unwrap();

    // Two failures leave one outstanding call, which can no longer make R=2.
    let result = tokio::time::timeout(Duration::from_secs(2), kv.get("k"))
        .await
        .expect("get waited on a replica that could not change the outcome");
    assert_eq!(
        result.unwrap_err(),
        StoreError::ReadQuorumNotMet {
            responses: 0,
            required: 2
        }
    );
}

#[tokio::test]
async fn test_all_replicas_down() {
    let kv = flaky_store(&["s1", "s2", "s3"], 1, 1);

    assert_eq!(
        kv.put("k", "v", "s1", None).await.unwrap_err(),
        StoreError::WriteQuorumNotMet {
            acks: 0,
            required: 1
        }
    );
    assert_eq!(
        kv.get("k").await.unwrap_err(),
        StoreError::ReadQuorumNotMet {
            responses: 0,
            required: 1
        }
    );
}

#[tokio::test]
async fn test_every_target_is_contacted() {
    let kv = flaky_store(&[], 3, 3);
    kv.put("k", "v", "s1", None).await.unwrap();
    kv.get("k").await.unwrap();

    for replica in kv.replicas() {
        assert_eq!(replica.calls.load(Ordering::SeqCst), 2);
    }
}

#[tokio::test]
async fn test_duplicate_replica_handles_rejected() {
    let replicas = vec![FlakyReplica::up("s1"), FlakyReplica::up("s1")];
    let err = DistributedKvStore::with_replicas(replicas, 1, 1, 1).unwrap_err();
    assert_eq!(
        err,
        StoreError::Config(quorum_kv::ConfigError::DuplicateReplica("s1".to_string()))
    );
}

#[tokio::test]
async fn test_single_replica_cluster() {
    let kv = DistributedKvStore::new(StoreConfig::new(["only"], 3, 1, 1)).unwrap();
    assert_eq!(kv.quorum().n, 1);

    let clock = kv.put("k", "v", "only", None).await.unwrap();
    assert_eq!(clock, VectorClock::from_entries([("only", 1)]));
    assert_eq!(kv.get("k").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_zero_quorums_always_succeed() {
    // Zero is a valid threshold: nothing has to acknowledge or answer.
    let kv = flaky_store(&["s1", "s2", "s3"], 0, 0);
    kv.put("k", "v", "s1", None).await.unwrap();
    assert!(kv.get("k").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_coordinator_outside_membership() {
    let kv = DistributedKvStore::new(StoreConfig::default()).unwrap();

    let clock = kv.put("k", "v", "client-42", None).await.unwrap();
    assert_eq!(clock.get("client-42"), 1);
    assert_eq!(clock.len(), 1);
}

#[tokio::test]
async fn test_parallel_independent_writers_all_survive() {
    let kv = Arc::new(DistributedKvStore::new(StoreConfig::default()).unwrap());

    let mut handles = Vec::new();
    for i in 0..16 {
        let kv = Arc::clone(&kv);
        handles.push(tokio::spawn(async move {
            kv.put("hot", format!("writer-{i}"), &format!("client-{i}"), None)
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Every writer used an empty base clock under its own identity: all concurrent.
    let versions = kv.get("hot").await.unwrap();
    let values: HashSet<&str> = versions.iter().map(|v| v.value()).collect();
    assert_eq!(values.len(), 16);

    // Each replica converged to the same sibling set regardless of arrival order.
    for replica in kv.replicas() {
        assert_eq!(replica.version_count("hot"), 16);
    }
}

#[tokio::test]
async fn test_parallel_writes_to_many_keys() {
    let config = StoreConfig::new(["a", "b", "c", "d"], 2, 2, 2);
    let kv = Arc::new(DistributedKvStore::new(config).unwrap());

    let mut handles = Vec::new();
    for i in 0..64 {
        let kv = Arc::clone(&kv);
        handles.push(tokio::spawn(async move {
            let key = format!("key-{i}");
            kv.put(&key, i.to_string(), "client", None).await.unwrap();
            key
        }));
    }

    for handle in handles {
        let key = handle.await.unwrap();
        let versions = kv.get(&key).await.unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(format!("key-{}", versions[0].value()), key);
    }

    let stored: usize = kv.replicas().iter().map(|r| r.key_count()).sum();
    assert_eq!(stored, 64 * 2);
}

#[tokio::test]
async fn test_unicode_keys_and_values() {
    let kv = DistributedKvStore::new(StoreConfig::default()).unwrap();
    let key = "ключ:🦀";
    kv.put(key, "значение 中文 🌟", "s1", None).await.unwrap();

    let versions = kv.get(key).await.unwrap();
    assert_eq!(versions[0].value(), "значение 中文 🌟");
}
