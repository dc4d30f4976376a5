//! Web server module for the quorum KV service.
//!
//! This module contains the Axum web server implementation that exposes the
//! coordinator's PUT and GET over HTTP.

pub mod routes;

// Re-export main server functionality
pub use routes::*;
