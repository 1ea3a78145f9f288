//! Error types for southbound calls.

use roc_types::ValueKind;
use tonic::Status;

/// Errors raised while talking to, or decoding answers from, the
/// configuration backend.
///
/// Backend statuses are carried as-is; translating them to HTTP happens
/// once, at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum SouthboundError {
    /// A point-read value had a different kind than the decoder expects.
    #[error("expecting a {expected} value, got {received}")]
    TypeMismatch {
        /// The kind the decoder requires.
        expected: ValueKind,
        /// The kind the backend actually returned.
        received: ValueKind,
    },

    /// The change stream broke after some records were received.
    /// Records received so far are discarded.
    #[error("change stream failed after {received} records: {source}")]
    StreamFailure {
        /// Number of records received before the failure.
        received: usize,
        /// Status reported by the stream.
        source: Box<Status>,
    },

    /// A unary call, or opening the stream, failed.
    #[error("backend call failed: {source}")]
    Backend {
        /// Status reported by the backend.
        source: Box<Status>,
    },

    /// The change stream produced more records than the configured cap.
    #[error("change stream exceeded the limit of {limit} records")]
    RecordLimit {
        /// The configured cap.
        limit: usize,
    },

    /// The request-scoped deadline expired before the backend answered.
    #[error("backend call exceeded deadline of {timeout_ms}ms")]
    Deadline {
        /// The deadline in milliseconds.
        timeout_ms: u64,
    },
}

impl SouthboundError {
    /// The backend status behind this error, if it came from the backend.
    pub fn status(&self) -> Option<&Status> {
        match self {
            Self::StreamFailure { source, .. } | Self::Backend { source } => Some(&**source),
            Self::TypeMismatch { .. } | Self::RecordLimit { .. } | Self::Deadline { .. } => None,
        }
    }
}

impl From<Status> for SouthboundError {
    fn from(status: Status) -> Self {
        Self::Backend {
            source: Box::new(status),
        }
    }
}
