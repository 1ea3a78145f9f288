//! Backend facade seam and the deadline-scoped [`Southbound`] handle.
//!
//! [`ConfigBackend`] is the only place the gateway touches the backend
//! transport. Its methods return boxed futures so the trait stays
//! dyn-compatible and one backend instance can be shared behind an
//! [`Arc`] by every request task.
//!
//! [`Southbound`] wraps a backend with the per-request deadline and the
//! change-stream record cap. Every call it makes is bounded by the
//! deadline; dropping the returned future (client disconnect) cancels the
//! pending call, including a receive blocked inside the change stream.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use roc_types::{
    Encoding, GetRequest, ListChangesRequest, Path, SetRequest, TargetName, Transaction,
};
use tonic::Status;
use tracing::{debug, info};

use crate::changelog::ChangeLog;
use crate::decode::{Lookup, decode_target_names};
use crate::error::SouthboundError;

/// Server stream of change records.
///
/// The stream ends either by returning `None` or by yielding `Ok(None)`;
/// both mean "no more data".
pub type ChangeStream = BoxStream<'static, Result<Option<roc_types::ChangeRecord>, Status>>;

/// Client facade of the configuration backend.
///
/// Implementations wrap the backend's RPC transport. Retry policy, if
/// any, belongs to the implementation; callers surface a failure once.
pub trait ConfigBackend: Send + Sync {
    /// Point read.
    fn get(&self, request: GetRequest) -> BoxFuture<'_, Result<roc_types::GetResponse, Status>>;

    /// Point write.
    fn set(&self, request: SetRequest) -> BoxFuture<'_, Result<roc_types::SetResponse, Status>>;

    /// Open the change-log stream.
    fn list_changes(
        &self,
        request: ListChangesRequest,
    ) -> BoxFuture<'_, Result<ChangeStream, Status>>;
}

/// Deadline-scoped access to the configuration backend.
#[derive(Clone)]
pub struct Southbound {
    backend: Arc<dyn ConfigBackend>,
    timeout: Duration,
    max_records: Option<usize>,
}

impl Southbound {
    /// Wrap a backend; every call is bounded by `timeout`.
    pub fn new(backend: Arc<dyn ConfigBackend>, timeout: Duration) -> Self {
        Self {
            backend,
            timeout,
            max_records: None,
        }
    }

    /// Cap the number of change records a single aggregation may hold.
    #[must_use]
    pub const fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = Some(max_records);
        self
    }

    /// The per-call deadline.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Read the names of every managed target.
    ///
    /// Issues a wildcard-target point read and decodes the leaf-list it
    /// returns. An absent value yields [`Lookup::Absent`].
    ///
    /// # Errors
    ///
    /// [`SouthboundError::Backend`] if the call fails,
    /// [`SouthboundError::TypeMismatch`] if the value is not a leaf-list,
    /// [`SouthboundError::Deadline`] if the deadline expires.
    pub async fn targets(&self) -> Result<Lookup<Vec<TargetName>>, SouthboundError> {
        let request = GetRequest {
            paths: vec![Path::all_targets()],
            encoding: Encoding::Proto,
        };
        info!(?request, "get request");

        let response = self
            .deadline(async { self.backend.get(request).await.map_err(SouthboundError::from) })
            .await?;
        let names = decode_target_names(response.first_value())?;
        if let Lookup::Found(found) = &names {
            debug!(count = found.len(), "targets decoded");
        }
        Ok(names)
    }

    /// Drain the change log into a list of transactions.
    ///
    /// Opens the stream in one-shot mode (`subscribe = false`) and reads
    /// it to the end. Output order equals receive order.
    ///
    /// # Errors
    ///
    /// [`SouthboundError::Backend`] if the stream cannot be opened,
    /// [`SouthboundError::StreamFailure`] if it breaks part way (nothing
    /// received so far is returned), [`SouthboundError::RecordLimit`] if
    /// the record cap is exceeded, [`SouthboundError::Deadline`] if the
    /// deadline expires.
    pub async fn transactions(&self) -> Result<Vec<Transaction>, SouthboundError> {
        info!("list changes - subscribe=false");
        self.deadline(async {
            let stream = self
                .backend
                .list_changes(ListChangesRequest { subscribe: false })
                .await?;
            let mut log = ChangeLog::new(stream);
            if let Some(limit) = self.max_records {
                log = log.with_limit(limit);
            }
            log.collect().await
        })
        .await
    }

    /// Forward a request body verbatim to the point-write path.
    ///
    /// The result is returned as the loosely-typed document the backend
    /// produced; absence checks are left to the caller.
    ///
    /// # Errors
    ///
    /// [`SouthboundError::Backend`] if the call fails,
    /// [`SouthboundError::Deadline`] if the deadline expires.
    pub async fn patch(
        &self,
        path: &str,
        payload: Vec<u8>,
    ) -> Result<Option<serde_json::Value>, SouthboundError> {
        let request = SetRequest {
            path: path.to_owned(),
            payload,
        };
        info!(path, bytes = request.payload.len(), "set request");
        let response = self
            .deadline(async { self.backend.set(request).await.map_err(SouthboundError::from) })
            .await?;
        Ok(response.result)
    }

    /// Run `call` under the per-call deadline.
    async fn deadline<T, F>(&self, call: F) -> Result<T, SouthboundError>
    where
        F: Future<Output = Result<T, SouthboundError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or_else(|_| {
                Err(SouthboundError::Deadline {
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                })
            })
    }
}

impl std::fmt::Debug for Southbound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Southbound")
            .field("timeout", &self.timeout)
            .field("max_records", &self.max_records)
            .finish_non_exhaustive()
    }
}
