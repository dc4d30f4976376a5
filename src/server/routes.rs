//! Route handlers for the quorum KV web server.
//!
//! This module contains all the HTTP route handlers and related types for the Axum server.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use quorum_kv::{DistributedKvStore, StoreError, VectorClock, VersionedValue, merged_clock};

/// Shared application state
pub type AppState = Arc<DistributedKvStore>;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Body of `PUT /kv/:key`
#[derive(Deserialize, Debug)]
pub struct PutRequest {
    pub value: String,
    pub coordinator: String,
    /// Clock returned by an earlier read or write of this key.
    #[serde(default)]
    pub context: Option<VectorClock>,
}

#[derive(Serialize, Debug)]
pub struct PutResponse {
    pub key: String,
    pub clock: VectorClock,
}

#[derive(Serialize, Debug)]
pub struct GetResponse {
    pub key: String,
    pub versions: Vec<VersionedValue>,
    /// Merged clock of `versions`; send it back to overwrite all of them.
    pub context: VectorClock,
}

/// Store failures rendered as JSON
pub struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            StoreError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StoreError::WriteQuorumNotMet { .. } | StoreError::ReadQuorumNotMet { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Basic health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let quorum = state.quorum();
    Json(HealthResponse {
        status: "ok".to_string(),
        message: format!(
            "{} replicas, N={} W={} R={}",
            state.ring().len(),
            quorum.n,
            quorum.w,
            quorum.r
        ),
    })
}

/// Reads every surviving version of a key
pub async fn get_key(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<GetResponse>, ApiError> {
    let versions = state.get(&key).await.inspect_err(|e| {
        warn!("GET {} failed: {}", key, e);
    })?;
    if versions.len() > 1 {
        info!("GET {} returned {} concurrent versions", key, versions.len());
    }

    let context = merged_clock(&versions);
    Ok(Json(GetResponse {
        key,
        versions,
        context,
    }))
}

/// Writes a value on behalf of the requesting coordinator
pub async fn put_key(
    Path(key): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<PutRequest>,
) -> Result<Json<PutResponse>, ApiError> {
    let clock = state
        .put(&key, request.value, &request.coordinator, request.context)
        .await
        .inspect_err(|e| warn!("PUT {} failed: {}", key, e))?;

    info!("PUT {} by {} -> {:?}", key, request.coordinator, clock.entries());
    Ok(Json(PutResponse { key, clock }))
}

/// Creates and configures the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/kv/:key", get(get_key).put(put_key))
        .with_state(state)
}
