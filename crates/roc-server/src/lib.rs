//! REST gateway over the configuration backend.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Backend reads** (`/targets`, `/transactions`) decoded into typed
//!   REST shapes and checked for absence before they are served
//! - **Backend writes** (`PATCH /roc-api`) and **sidecar triggers**
//!   (`POST /synchronize/{service}`), both behind a role check
//! - **OpenAPI documents** (`/spec`, `/spec/{surface}`) rendered as JSON,
//!   YAML or an HTML page depending on the `Accept` header
//!
//! # Architecture
//!
//! Handlers hold no mutable state. Each request makes its own deadline-bound
//! backend calls through [`roc_southbound::Southbound`]; every failure ends
//! up as an [`ApiError`], whose status is decided in one place.

pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod negotiate;
pub mod router;
pub mod server;
pub mod spec_docs;
pub mod state;
pub mod status;
pub mod sync;

// Re-export primary types for convenience.
pub use config::{ConfigError, GatewayConfig};
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use spec_docs::{SpecDocument, SpecError, SpecRegistry};
pub use state::AppState;
