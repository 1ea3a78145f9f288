//! Error types for the HTTP layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Backend
//! errors are translated here, once, through [`http_status`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use roc_southbound::SouthboundError;
use tracing::warn;

use crate::auth::AuthError;
use crate::status::http_status;

/// Media types the spec endpoints can produce.
pub const SUPPORTED_MEDIA_TYPES: &str = "application/yaml, application/json and text/html";

/// Errors that can occur while serving a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Nothing was retrieved for the resource.
    #[error("not found: {0}")]
    NotFound(String),

    /// A backend call or decode step failed.
    #[error(transparent)]
    Southbound(#[from] SouthboundError),

    /// The HTML page template could not be loaded, parsed or rendered.
    #[error("template error: {0}")]
    Template(String),

    /// No supported rendering matches the `Accept` header.
    #[error(
        "only {supported} encoding supported. No match for {accept}",
        supported = SUPPORTED_MEDIA_TYPES
    )]
    UnsupportedMediaType {
        /// The rejected `Accept` value.
        accept: String,
    },

    /// The caller failed the authorization gate.
    #[error("authorization failed: {0}")]
    Unauthorized(#[from] AuthError),

    /// A JSON serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The request could not be carried out as given.
    #[error("{0}")]
    BadRequest(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status this error is served with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Southbound(err) => southbound_status(err),
            Self::UnsupportedMediaType { .. } => StatusCode::NOT_IMPLEMENTED,
            Self::Unauthorized(AuthError::MissingRole { .. }) => StatusCode::FORBIDDEN,
            Self::Unauthorized(AuthError::MissingToken | AuthError::InvalidToken) => {
                StatusCode::UNAUTHORIZED
            }
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Template(_) | Self::Serialization(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

fn southbound_status(err: &SouthboundError) -> StatusCode {
    match err {
        SouthboundError::StreamFailure { source, .. } | SouthboundError::Backend { source } => {
            http_status(source.code())
        }
        SouthboundError::TypeMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        SouthboundError::RecordLimit { .. } => StatusCode::BAD_GATEWAY,
        SouthboundError::Deadline { .. } => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            // Report the backend's own message rather than our wrapper text.
            Self::Southbound(
                SouthboundError::Backend { source } | SouthboundError::StreamFailure { source, .. },
            ) => source.message().to_owned(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "request failed");
        }

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
