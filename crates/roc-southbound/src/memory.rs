//! In-process configuration backend.
//!
//! [`MemoryBackend`] answers the three facade calls from data held in
//! memory. Tests script it with the builder methods (including stream
//! failures and empty records); local runs load a [`MemorySnapshot`] from
//! YAML. It holds no locks: every call works on a clone of the script.

use std::path::Path;

use futures::FutureExt;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use roc_types::{
    ChangeRecord, GetRequest, GetResponse, ListChangesRequest, SetRequest, SetResponse,
    TypedValue, Update,
};
use serde::Deserialize;
use tonic::Status;

use crate::client::{ChangeStream, ConfigBackend};

/// Errors that can occur when loading a backend snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Failed to read the snapshot file from disk.
    #[error("failed to read snapshot file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse snapshot YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for SnapshotError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Backend contents as stored in a snapshot file.
///
/// ```yaml
/// targets: [connectivity-service-v4, enterprise-1]
/// changes:
///   - id: tx-1
///     index: 1
///     username: onos
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MemorySnapshot {
    /// Target names, served as a leaf-list of strings.
    #[serde(default)]
    pub targets: Option<Vec<String>>,
    /// Change-log backlog, in stream order.
    #[serde(default)]
    pub changes: Vec<ChangeRecord>,
}

impl MemorySnapshot {
    /// Parse a snapshot from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Yaml`] if the string is not a valid snapshot.
    pub fn parse(yaml: &str) -> Result<Self, SnapshotError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Load a snapshot from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if the file cannot be read, or
    /// [`SnapshotError::Yaml`] if its content is not a valid snapshot.
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }
}

/// One scripted element of the change stream.
#[derive(Debug, Clone)]
enum StreamItem {
    Record(Box<ChangeRecord>),
    Nil,
    Fail(Status),
}

/// Configuration backend served from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    target_value: Option<TypedValue>,
    get_error: Option<Status>,
    set_result: Option<SetResponse>,
    set_error: Option<Status>,
    open_error: Option<Status>,
    stream: Vec<StreamItem>,
    subscribed: bool,
}

impl MemoryBackend {
    /// An empty backend: no target value and an empty change log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a backend from snapshot contents.
    pub fn from_snapshot(snapshot: MemorySnapshot) -> Self {
        let target_value = snapshot.targets.map(|names| {
            TypedValue::LeafList(names.into_iter().map(TypedValue::String).collect())
        });
        Self {
            target_value,
            stream: snapshot
                .changes
                .into_iter()
                .map(|record| StreamItem::Record(Box::new(record)))
                .collect(),
            ..Self::default()
        }
    }

    /// Value returned by the wildcard-target point read.
    #[must_use]
    pub fn with_target_value(mut self, value: TypedValue) -> Self {
        self.target_value = Some(value);
        self
    }

    /// Fail every point read with `status`.
    #[must_use]
    pub fn with_get_error(mut self, status: Status) -> Self {
        self.get_error = Some(status);
        self
    }

    /// Answer every point write with `result` instead of echoing the payload.
    #[must_use]
    pub fn with_set_result(mut self, result: Option<serde_json::Value>) -> Self {
        self.set_result = Some(SetResponse { result });
        self
    }

    /// Fail every point write with `status`.
    #[must_use]
    pub fn with_set_error(mut self, status: Status) -> Self {
        self.set_error = Some(status);
        self
    }

    /// Fail opening the change stream with `status`.
    #[must_use]
    pub fn with_open_error(mut self, status: Status) -> Self {
        self.open_error = Some(status);
        self
    }

    /// Append a record to the change stream.
    #[must_use]
    pub fn with_record(mut self, record: ChangeRecord) -> Self {
        self.stream.push(StreamItem::Record(Box::new(record)));
        self
    }

    /// Append an empty record to the change stream.
    #[must_use]
    pub fn with_nil_record(mut self) -> Self {
        self.stream.push(StreamItem::Nil);
        self
    }

    /// Append a receive failure to the change stream.
    #[must_use]
    pub fn with_stream_error(mut self, status: Status) -> Self {
        self.stream.push(StreamItem::Fail(status));
        self
    }

    /// Keep every stream open after the backlog, as a subscription would,
    /// regardless of the request's `subscribe` flag.
    #[must_use]
    pub const fn subscribed(mut self) -> Self {
        self.subscribed = true;
        self
    }

    fn backlog(&self) -> stream::Iter<std::vec::IntoIter<Result<Option<ChangeRecord>, Status>>> {
        let items: Vec<_> = self
            .stream
            .iter()
            .cloned()
            .map(|item| match item {
                StreamItem::Record(record) => Ok(Some(*record)),
                StreamItem::Nil => Ok(None),
                StreamItem::Fail(status) => Err(status),
            })
            .collect();
        stream::iter(items)
    }
}

impl ConfigBackend for MemoryBackend {
    fn get(&self, request: GetRequest) -> BoxFuture<'_, Result<GetResponse, Status>> {
        let result = match &self.get_error {
            Some(status) => Err(status.clone()),
            None => Ok(GetResponse {
                updates: request
                    .paths
                    .into_iter()
                    .take(1)
                    .map(|path| Update {
                        path,
                        value: self.target_value.clone(),
                    })
                    .collect(),
            }),
        };
        futures::future::ready(result).boxed()
    }

    fn set(&self, request: SetRequest) -> BoxFuture<'_, Result<SetResponse, Status>> {
        let result = if let Some(status) = &self.set_error {
            Err(status.clone())
        } else if let Some(response) = &self.set_result {
            Ok(response.clone())
        } else {
            serde_json::from_slice(&request.payload)
                .map(|doc| SetResponse { result: Some(doc) })
                .map_err(|e| Status::invalid_argument(format!("{}: {e}", request.path)))
        };
        futures::future::ready(result).boxed()
    }

    fn list_changes(
        &self,
        request: ListChangesRequest,
    ) -> BoxFuture<'_, Result<ChangeStream, Status>> {
        let result = match &self.open_error {
            Some(status) => Err(status.clone()),
            None => {
                let backlog = self.backlog();
                let stream: ChangeStream = if request.subscribe || self.subscribed {
                    backlog.chain(stream::pending()).boxed()
                } else {
                    backlog.boxed()
                };
                Ok(stream)
            }
        };
        futures::future::ready(result).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::ChangeLog;
    use crate::error::SouthboundError;

    #[test]
    fn snapshot_parses_targets_and_changes() {
        let yaml = r"
targets: [connectivity-service-v4, enterprise-1]
changes:
  - id: tx-1
    index: 1
    username: onos
    status: { phase: 0, state: 1 }
    changes:
      - target_id: enterprise-1
        target_type: aether
        target_version: 2.1.0
        values:
          - path: /enterprise/description
            value: { kind: string, value: lab }
  - id: tx-2
    index: 2
";
        let snapshot = MemorySnapshot::parse(yaml);
        let Ok(snapshot) = snapshot else {
            panic!("snapshot should parse");
        };
        assert_eq!(
            snapshot.targets.as_deref(),
            Some(&["connectivity-service-v4".to_owned(), "enterprise-1".to_owned()][..])
        );
        assert_eq!(snapshot.changes.len(), 2);
        assert_eq!(snapshot.changes[0].changes[0].values.len(), 1);
    }

    #[test]
    fn malformed_snapshot_is_yaml_error() {
        let result = MemorySnapshot::parse("targets: {not: [a list");
        assert!(matches!(result, Err(SnapshotError::Yaml { .. })));
    }

    #[test]
    fn missing_snapshot_file_is_io_error() {
        let result = MemorySnapshot::from_file(Path::new("/nonexistent/roc-snapshot.yaml"));
        assert!(matches!(result, Err(SnapshotError::Io { .. })));
    }

    #[tokio::test]
    async fn scripted_stream_replays_for_every_call() {
        let backend = MemoryBackend::new()
            .with_record(ChangeRecord::default())
            .with_nil_record()
            .with_record(ChangeRecord::default());
        for _ in 0..2 {
            let stream = backend
                .list_changes(ListChangesRequest { subscribe: false })
                .await;
            let Ok(stream) = stream else {
                panic!("stream should open");
            };
            let txs = ChangeLog::new(stream).collect().await.unwrap_or_default();
            assert_eq!(txs.len(), 1);
        }
    }

    #[tokio::test]
    async fn open_error_is_returned_before_streaming() {
        let backend = MemoryBackend::new().with_open_error(Status::permission_denied("nope"));
        let result = backend
            .list_changes(ListChangesRequest { subscribe: false })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn stream_error_surfaces_from_reader() {
        let backend = MemoryBackend::new()
            .with_record(ChangeRecord::default())
            .with_stream_error(Status::unavailable("gone"));
        let Ok(stream) = backend
            .list_changes(ListChangesRequest { subscribe: false })
            .await
        else {
            panic!("stream should open");
        };
        let result = ChangeLog::new(stream).collect().await;
        assert!(matches!(
            result,
            Err(SouthboundError::StreamFailure { received: 1, .. })
        ));
    }

    #[tokio::test]
    async fn set_rejects_non_json_payload() {
        let backend = MemoryBackend::new();
        let result = backend
            .set(SetRequest {
                path: "/roc-api".to_owned(),
                payload: b"not json".to_vec(),
            })
            .await;
        let Err(status) = result else {
            panic!("expected invalid argument");
        };
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }
}
