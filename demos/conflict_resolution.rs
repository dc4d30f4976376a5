//! Walkthrough of concurrent writes and their resolution.
//!
//! Two coordinators update the same key from a shared starting version, the
//! store keeps both as siblings, and a third write with the merged clock
//! collapses them back into a single version.
//!
//! Run with: cargo run --example conflict_resolution

use quorum_kv::{DistributedKvStore, StoreConfig, VersionedValue, merged_clock};

fn show(label: &str, versions: &[VersionedValue]) {
    println!("  {label}:");
    for version in versions {
        println!("    '{}' @ {:?}", version.value(), version.clock().entries());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Quorum KV Conflict Resolution Example ===\n");

    let kv = DistributedKvStore::new(StoreConfig::new(["s1", "s2", "s3"], 3, 2, 2))?;
    let key = "profile:name";
    println!(
        "Replicas for '{}': {:?} (N=3, W=2, R=2)\n",
        key,
        kv.ring().resolve(key)
    );

    // s1 writes the initial value
    let base = kv.put(key, "john", "s1", None).await?;
    println!("s1 writes 'john' -> clock {:?}", base.entries());
    show("after first write", &kv.get(key).await?);

    // s2 and s3 both start from that version without seeing each other
    println!("\ns2 and s3 update concurrently from the same base clock:");
    let sf = kv.put(key, "johnSF", "s2", Some(base.clone())).await?;
    let ny = kv.put(key, "johnNY", "s3", Some(base)).await?;
    println!("  s2 -> {:?}", sf.entries());
    println!("  s3 -> {:?}", ny.entries());

    let siblings = kv.get(key).await?;
    show("siblings returned by GET", &siblings);
    assert_eq!(siblings.len(), 2);

    // Any writer holding the merged context can resolve the conflict
    println!("\n--- Resolving ---");
    let context = merged_clock(&siblings);
    println!("merged context {:?}", context.entries());
    kv.put(key, "johnMerged", "s1", Some(context)).await?;

    let resolved = kv.get(key).await?;
    show("after merge write", &resolved);
    assert_eq!(resolved.len(), 1);

    println!("\nPer-replica version counts:");
    for replica in kv.replicas() {
        println!("  {} holds {} version(s)", replica.id(), replica.version_count(key));
    }

    Ok(())
}
