//! Axum router construction for the gateway.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the gateway.
///
/// The router includes:
/// - `GET /targets` -- managed target names
/// - `GET /transactions` -- the change log as transactions
/// - `PATCH /roc-api` -- point write (admin role)
/// - `POST /synchronize/{service}` -- trigger a sidecar (admin role)
/// - `GET /spec` -- gateway OpenAPI document
/// - `GET /spec/{surface}` -- OpenAPI document of one surface
///
/// CORS allows any origin so browser-based API explorers can call in.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Backend reads and writes
        .route("/targets", get(handlers::get_targets))
        .route("/transactions", get(handlers::get_transactions))
        .route("/roc-api", patch(handlers::patch_roc_api))
        .route("/synchronize/{service}", post(handlers::post_synchronize))
        // API documents
        .route("/spec", get(handlers::get_spec))
        .route("/spec/{surface}", get(handlers::get_surface_spec))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
