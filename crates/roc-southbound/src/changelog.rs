//! Change-log aggregation.
//!
//! [`ChangeLog`] reads the backend change stream one record at a time and
//! projects each record into a [`Transaction`]. It is a lazy, finite reader:
//! it can be drained with [`ChangeLog::collect`], stopped early by dropping
//! it, and bounded with [`ChangeLog::with_limit`]. Restarting means opening
//! a new stream.
//!
//! The stream is considered finished on a clean end **or** on an empty
//! (`None`) record. Backends signal completion either way, and neither is
//! treated as authoritative.

use futures::StreamExt;
use roc_types::{
    Change, ChangeRecord, ChangeValue, ChangedValue, TargetChange, Transaction,
    TransactionPhase, TransactionState, TransactionStatus,
};
use tracing::{debug, warn};

use crate::client::ChangeStream;
use crate::error::SouthboundError;

/// Bounded reader over a change stream.
pub struct ChangeLog {
    stream: ChangeStream,
    limit: Option<usize>,
    received: usize,
    finished: bool,
}

impl ChangeLog {
    /// Wrap an opened change stream.
    pub fn new(stream: ChangeStream) -> Self {
        Self {
            stream,
            limit: None,
            received: 0,
            finished: false,
        }
    }

    /// Refuse to hold more than `limit` records.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Number of records received so far.
    pub const fn received(&self) -> usize {
        self.received
    }

    /// Receive the next transaction.
    ///
    /// Returns `Ok(None)` once the stream is finished; further calls keep
    /// returning `Ok(None)` without touching the stream.
    ///
    /// # Errors
    ///
    /// [`SouthboundError::StreamFailure`] on a receive error and
    /// [`SouthboundError::RecordLimit`] when a record arrives past the cap.
    /// Both finish the reader.
    pub async fn next(&mut self) -> Result<Option<Transaction>, SouthboundError> {
        if self.finished {
            return Ok(None);
        }
        match self.stream.next().await {
            None | Some(Ok(None)) => {
                self.finished = true;
                debug!(received = self.received, "change stream finished");
                Ok(None)
            }
            Some(Err(status)) => {
                self.finished = true;
                warn!(received = self.received, %status, "change stream failed");
                Err(SouthboundError::StreamFailure {
                    received: self.received,
                    source: Box::new(status),
                })
            }
            Some(Ok(Some(record))) => {
                if let Some(limit) = self.limit.filter(|&limit| self.received >= limit) {
                    self.finished = true;
                    return Err(SouthboundError::RecordLimit { limit });
                }
                self.received = self.received.saturating_add(1);
                Ok(Some(project(record)))
            }
        }
    }

    /// Drain the remaining stream into a list, in receive order.
    ///
    /// On error the transactions read so far are dropped; the caller never
    /// sees a partial list.
    ///
    /// # Errors
    ///
    /// Any error from [`ChangeLog::next`].
    pub async fn collect(mut self) -> Result<Vec<Transaction>, SouthboundError> {
        let mut transactions = Vec::new();
        while let Some(transaction) = self.next().await? {
            transactions.push(transaction);
        }
        Ok(transactions)
    }
}

impl std::fmt::Debug for ChangeLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeLog")
            .field("limit", &self.limit)
            .field("received", &self.received)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

/// Project one change record into a REST transaction.
///
/// Absent nested fields take their zero value. Change and value order is
/// kept exactly as received.
pub fn project(record: ChangeRecord) -> Transaction {
    let status = record.status.unwrap_or_default();
    Transaction {
        id: record.id,
        index: ordering_key(record.index),
        revision: ordering_key(record.revision),
        status: TransactionStatus {
            phase: TransactionPhase::from_ordinal(status.phase),
            state: TransactionState::from_ordinal(status.state),
        },
        created: record.created,
        updated: record.updated,
        deleted: record.deleted,
        username: record.username.unwrap_or_default(),
        changes: record.changes.into_iter().map(project_change).collect(),
    }
}

fn project_change(change: TargetChange) -> Change {
    Change {
        target_id: change.target_id,
        target_type: change.target_type,
        target_version: change.target_version,
        values: change.values.into_iter().map(project_value).collect(),
    }
}

fn project_value(value: ChangedValue) -> ChangeValue {
    ChangeValue {
        path: value.path,
        removed: value.removed,
        value: value.value.map(|v| v.to_string()).unwrap_or_default(),
    }
}

/// Backend ordering keys are unsigned; REST exposes them as `int64`.
fn ordering_key(key: u64) -> i64 {
    i64::try_from(key).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use futures::stream;
    use roc_types::{ChangeStatus, TypedValue};
    use tonic::Status;

    use super::*;

    fn record(id: &str, index: u64) -> ChangeRecord {
        ChangeRecord {
            id: id.to_owned(),
            index,
            ..ChangeRecord::default()
        }
    }

    fn log(items: Vec<Result<Option<ChangeRecord>, Status>>) -> ChangeLog {
        ChangeLog::new(stream::iter(items).boxed())
    }

    #[tokio::test]
    async fn two_records_keep_arrival_order() {
        let items = vec![Ok(Some(record("a", 1))), Ok(Some(record("b", 2)))];
        let txs = log(items).collect().await.unwrap_or_default();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].id, "a");
        assert_eq!(txs[0].index, 1);
        assert_eq!(txs[1].id, "b");
        assert_eq!(txs[1].index, 2);
        assert!(txs.iter().all(|tx| tx.changes.is_empty()));
    }

    #[tokio::test]
    async fn arrival_order_is_not_resorted() {
        let items = vec![
            Ok(Some(record("late", 9))),
            Ok(Some(record("early", 1))),
            Ok(Some(record("late", 9))),
        ];
        let ids: Vec<String> = log(items)
            .collect()
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|tx| tx.id)
            .collect();
        assert_eq!(ids, ["late", "early", "late"]);
    }

    #[tokio::test]
    async fn empty_stream_is_empty_and_ok() {
        let result = log(Vec::new()).collect().await;
        assert!(matches!(result, Ok(ref v) if v.is_empty()));
    }

    #[tokio::test]
    async fn nil_record_ends_the_stream() {
        let items = vec![
            Ok(Some(record("a", 1))),
            Ok(None),
            Ok(Some(record("never", 2))),
        ];
        let txs = log(items).collect().await.unwrap_or_default();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].id, "a");
    }

    #[tokio::test]
    async fn failure_discards_partial_results() {
        let items = vec![
            Ok(Some(record("a", 1))),
            Ok(Some(record("b", 2))),
            Err(Status::internal("broken pipe")),
            Ok(Some(record("c", 3))),
        ];
        let result = log(items).collect().await;
        let Err(SouthboundError::StreamFailure { received, source }) = result else {
            panic!("expected a stream failure");
        };
        assert_eq!(received, 2);
        assert_eq!(source.code(), tonic::Code::Internal);
    }

    #[tokio::test]
    async fn next_after_finish_stays_finished() {
        let mut reader = log(vec![Ok(Some(record("a", 1)))]);
        assert!(matches!(reader.next().await, Ok(Some(_))));
        assert!(matches!(reader.next().await, Ok(None)));
        assert!(matches!(reader.next().await, Ok(None)));
        assert_eq!(reader.received(), 1);
    }

    #[tokio::test]
    async fn limit_allows_exactly_limit_records() {
        let items = vec![Ok(Some(record("a", 1))), Ok(Some(record("b", 2)))];
        let txs = log(items).with_limit(2).collect().await;
        assert!(matches!(txs, Ok(ref v) if v.len() == 2));

        let items = vec![
            Ok(Some(record("a", 1))),
            Ok(Some(record("b", 2))),
            Ok(Some(record("c", 3))),
        ];
        let txs = log(items).with_limit(2).collect().await;
        assert!(matches!(txs, Err(SouthboundError::RecordLimit { limit: 2 })));
    }

    #[test]
    fn projection_maps_nested_records() {
        let created = Utc.with_ymd_and_hms(2022, 1, 20, 10, 0, 0).single();
        let rec = ChangeRecord {
            id: "tx-7".to_owned(),
            index: 7,
            revision: 12,
            status: Some(ChangeStatus { phase: 1, state: 2 }),
            created,
            updated: None,
            deleted: None,
            username: Some("alice".to_owned()),
            changes: vec![TargetChange {
                target_id: "connectivity-service-v4".to_owned(),
                target_type: "Aether".to_owned(),
                target_version: "4.0.0".to_owned(),
                values: vec![
                    ChangedValue {
                        path: "/site[site-id=s1]/display-name".to_owned(),
                        value: Some(TypedValue::String("Site 1".to_owned())),
                        removed: false,
                    },
                    ChangedValue {
                        path: "/site[site-id=s1]/imsi-definition/mcc".to_owned(),
                        value: Some(TypedValue::Uint(310)),
                        removed: true,
                    },
                ],
            }],
        };

        let tx = project(rec);
        assert_eq!(tx.id, "tx-7");
        assert_eq!(tx.revision, 12);
        assert_eq!(tx.status.phase, TransactionPhase::Rollback);
        assert_eq!(tx.status.state, TransactionState::Failed);
        assert_eq!(tx.created, created);
        assert_eq!(tx.username, "alice");
        assert_eq!(tx.changes.len(), 1);
        let values = &tx.changes[0].values;
        assert_eq!(values[0].value, "Site 1");
        assert!(values[1].removed);
        assert_eq!(values[1].value, "310");
    }

    #[test]
    fn projection_zero_values_for_absent_fields() {
        let tx = project(ChangeRecord {
            changes: vec![TargetChange {
                values: vec![ChangedValue::default()],
                ..TargetChange::default()
            }],
            ..ChangeRecord::default()
        });
        assert_eq!(tx.status, TransactionStatus::default());
        assert_eq!(tx.username, "");
        assert!(tx.created.is_none());
        assert_eq!(tx.changes[0].values[0].value, "");
        assert!(!tx.changes[0].values[0].removed);
    }

    #[test]
    fn oversized_ordering_key_saturates() {
        assert_eq!(ordering_key(u64::MAX), i64::MAX);
    }
}
