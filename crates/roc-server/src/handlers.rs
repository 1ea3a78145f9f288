//! REST endpoint handlers for the gateway.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/targets` | Names of all managed targets |
//! | `GET` | `/transactions` | Every change record, in backend order |
//! | `PATCH` | `/roc-api` | Point write of the request body |
//! | `POST` | `/synchronize/{service}` | Trigger a service's sidecar |
//! | `GET` | `/spec` | Gateway OpenAPI document |
//! | `GET` | `/spec/{surface}` | OpenAPI document of a surface |

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::ACCEPT;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::Response;
use roc_types::{TargetName, Transaction};
use tracing::info;

use crate::error::ApiError;
use crate::gate::respond;
use crate::negotiate::{self, PageData};
use crate::spec_docs::SpecDocument;
use crate::state::AppState;

/// Backend path written by `PATCH /roc-api`.
const ROC_API_PATH: &str = "/roc-api";

// ---------------------------------------------------------------------------
// GET /targets
// ---------------------------------------------------------------------------

/// List the names of all managed targets.
///
/// 404 when the backend holds no target list at all; an empty list is 200.
pub async fn get_targets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TargetName>>, ApiError> {
    info!("GET /targets");
    let targets = state.southbound.targets().await?;
    respond(targets, "targets")
}

// ---------------------------------------------------------------------------
// GET /transactions
// ---------------------------------------------------------------------------

/// List every change record as a transaction, in stream order.
pub async fn get_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    info!("GET /transactions");
    let transactions = state.southbound.transactions().await?;
    respond(transactions, "transactions")
}

// ---------------------------------------------------------------------------
// PATCH /roc-api
// ---------------------------------------------------------------------------

/// Forward the request body to the backend as a point write.
///
/// The caller must hold the admin role; nothing reaches the backend
/// otherwise.
pub async fn patch_roc_api(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    info!(bytes = body.len(), "PATCH /roc-api");
    state.authorizer.authorize(&headers, &state.admin_role)?;
    let result = state.southbound.patch(ROC_API_PATH, body.to_vec()).await?;
    respond(result, "roc-api")
}

// ---------------------------------------------------------------------------
// POST /synchronize/{service}
// ---------------------------------------------------------------------------

/// Ask a service's sidecar to push its configuration again.
///
/// The sidecar's status is passed through and its body is wrapped as
/// `{"response": body}`.
pub async fn post_synchronize(
    State(state): State<Arc<AppState>>,
    Path(service): Path<String>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    info!(service = %service, "POST /synchronize");
    state.authorizer.authorize(&headers, &state.admin_role)?;
    let (status, body) = state.sync.trigger(&service).await?;
    Ok((status, Json(serde_json::json!({ "response": body }))))
}

// ---------------------------------------------------------------------------
// GET /spec, GET /spec/{surface}
// ---------------------------------------------------------------------------

/// The gateway's own OpenAPI document, rendered per `Accept`.
pub async fn get_spec(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ApiError> {
    info!("GET /spec");
    serve_spec(&state, &state.specs.gateway(), &headers, &uri).await
}

/// A surface's OpenAPI document, rendered per `Accept`.
pub async fn get_surface_spec(
    State(state): State<Arc<AppState>>,
    Path(surface): Path<String>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ApiError> {
    info!(surface = %surface, "GET /spec surface");
    let doc = state
        .specs
        .surface(&surface)
        .ok_or_else(|| ApiError::NotFound(format!("spec surface {surface}")))?;
    serve_spec(&state, &doc, &headers, &uri).await
}

async fn serve_spec(
    state: &AppState,
    doc: &SpecDocument,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<Response, ApiError> {
    // A missing header matches nothing and is refused like any other.
    let accept = headers
        .get(ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let request_path = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |pq| pq.as_str());
    let page = PageData {
        request_path: request_path.strip_prefix('/').unwrap_or(request_path),
        description: &state.description,
    };
    negotiate::render(doc.document(), accept, &state.template_path, &page).await
}
