//! Main entry point for the quorum KV web server.
//!
//! This binary builds an in-process replica cluster from configuration and
//! serves it over HTTP using the Axum web framework.
//!
//! Environment:
//! - `QUORUM_KV_CONFIG` - path to a JSON `StoreConfig` (defaults: s1..s3, N=3 W=2 R=2)
//! - `QUORUM_KV_ADDR`   - listen address (default `127.0.0.1:3000`)
//! - `RUST_LOG`         - tracing filter (default `info`)

use std::net::SocketAddr;
use std::sync::Arc;

use quorum_kv::{DistributedKvStore, StoreConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod server;

use server::create_router;

fn load_config() -> Result<StoreConfig, Box<dyn std::error::Error>> {
    match std::env::var("QUORUM_KV_CONFIG") {
        Ok(path) => {
            info!("Loading store configuration from {}", path);
            let json = std::fs::read_to_string(&path)?;
            Ok(StoreConfig::from_json(&json)?)
        }
        Err(_) => Ok(StoreConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting quorum KV Axum server...");

    let config = load_config()?;
    info!(
        "Replicas {:?}, N={} W={} R={}",
        config.replicas, config.replication_factor, config.write_quorum, config.read_quorum
    );
    let store = Arc::new(DistributedKvStore::new(config)?);

    // Build our application with routes from the server module
    let app = create_router(store);

    let addr: SocketAddr = std::env::var("QUORUM_KV_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()?;

    info!("Server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /health   - Cluster summary");
    info!("  GET  /kv/:key  - Read all surviving versions");
    info!("  PUT  /kv/:key  - Write a value");
    info!("");
    info!("Try these commands:");
    let body = r#"{"value":"alice","coordinator":"s1"}"#;
    info!(
        "  curl -X PUT http://{}/kv/user:1 -H 'Content-Type: application/json' -d '{}'",
        addr, body
    );
    info!("  curl http://{}/kv/user:1", addr);

    // Run the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
