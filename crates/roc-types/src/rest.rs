//! REST resources served by the gateway.
//!
//! Field names follow the published OpenAPI document (`camelCase`).
//! Every resource is built fresh per request from southbound records
//! and dropped once the response is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Name of one managed target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TargetName {
    /// The target name.
    pub name: String,
}

/// Phase of a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum TransactionPhase {
    /// The change is being applied.
    #[default]
    Change,
    /// The change is being rolled back.
    Rollback,
}

impl TransactionPhase {
    /// Map a wire ordinal; unknown ordinals fall back to the zero value.
    pub const fn from_ordinal(ordinal: i32) -> Self {
        match ordinal {
            1 => Self::Rollback,
            _ => Self::Change,
        }
    }
}

/// State of a transaction within its phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum TransactionState {
    /// Not yet applied.
    #[default]
    Pending,
    /// Applied successfully.
    Complete,
    /// Failed to apply.
    Failed,
}

impl TransactionState {
    /// Map a wire ordinal; unknown ordinals fall back to the zero value.
    pub const fn from_ordinal(ordinal: i32) -> Self {
        match ordinal {
            1 => Self::Complete,
            2 => Self::Failed,
            _ => Self::Pending,
        }
    }
}

/// Phase/state pair of a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TransactionStatus {
    /// Current phase.
    pub phase: TransactionPhase,
    /// Current state.
    pub state: TransactionState,
}

/// A network-wide configuration transaction.
///
/// `index` and `revision` are opaque ordering keys assigned by the
/// backend; the gateway never recomputes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Transaction {
    /// Transaction identifier.
    pub id: String,
    /// Backend-assigned index.
    pub index: i64,
    /// Backend-assigned revision.
    pub revision: i64,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub created: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub updated: Option<DateTime<Utc>>,
    /// Deletion time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub deleted: Option<DateTime<Utc>>,
    /// Submitting user.
    pub username: String,
    /// Per-target changes, same order as received from the backend.
    pub changes: Vec<Change>,
}

/// One target's delta within a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Change {
    /// Target identifier.
    pub target_id: String,
    /// Target model type.
    pub target_type: String,
    /// Target model version.
    pub target_version: String,
    /// Changed values.
    pub values: Vec<ChangeValue>,
}

/// One changed leaf.
///
/// A removed leaf may still carry its last-known `value`; check
/// `removed` first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChangeValue {
    /// Leaf path.
    pub path: String,
    /// Whether the leaf was removed.
    pub removed: bool,
    /// String rendering of the backend value.
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ordinals() {
        assert_eq!(TransactionPhase::from_ordinal(1), TransactionPhase::Rollback);
        assert_eq!(TransactionPhase::from_ordinal(9), TransactionPhase::Change);
        assert_eq!(TransactionState::from_ordinal(2), TransactionState::Failed);
        assert_eq!(TransactionState::from_ordinal(-1), TransactionState::Pending);
    }

    #[test]
    fn transaction_serializes_camel_case() {
        let tx = Transaction {
            id: "tx-1".to_owned(),
            index: 3,
            revision: 4,
            status: TransactionStatus {
                phase: TransactionPhase::Change,
                state: TransactionState::Complete,
            },
            created: None,
            updated: None,
            deleted: None,
            username: "onos".to_owned(),
            changes: vec![Change {
                target_id: "enterprise-1".to_owned(),
                target_type: "aether".to_owned(),
                target_version: "2.1.0".to_owned(),
                values: vec![ChangeValue {
                    path: "/site[id=s1]/description".to_owned(),
                    removed: false,
                    value: "lab".to_owned(),
                }],
            }],
        };
        let json = serde_json::to_value(&tx).unwrap_or_default();
        assert_eq!(json["status"]["state"], "COMPLETE");
        assert_eq!(json["changes"][0]["targetId"], "enterprise-1");
        assert_eq!(json["changes"][0]["values"][0]["removed"], false);
        assert!(json.get("created").is_none());
    }
}
