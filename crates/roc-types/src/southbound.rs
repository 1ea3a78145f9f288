//! Records exchanged with the configuration backend.
//!
//! These mirror the shape of the backend's get/set and change-log RPCs
//! without committing to their wire format. Every optional field carries
//! `#[serde(default)]` so a sparse record still deserializes, and absent
//! nested messages are `None` rather than an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::TypedValue;

// ---------------------------------------------------------------------------
// Point read / write
// ---------------------------------------------------------------------------

/// Encoding requested for point-read values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Values come back as [`TypedValue`] scalars and lists.
    #[default]
    Proto,
    /// Values come back as JSON documents.
    Json,
}

/// Addressing path of a point read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    /// Target (device) name; `*` addresses every target.
    #[serde(default)]
    pub target: String,
    /// Path elements below the target root.
    #[serde(default)]
    pub elements: Vec<String>,
}

impl Path {
    /// A path addressing the root of every known target.
    pub fn all_targets() -> Self {
        Self {
            target: String::from("*"),
            elements: Vec::new(),
        }
    }
}

/// Request for a point read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest {
    /// Paths to read.
    pub paths: Vec<Path>,
    /// Requested value encoding.
    #[serde(default)]
    pub encoding: Encoding,
}

/// One addressed value inside a point-read response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// Path the value was read from.
    #[serde(default)]
    pub path: Path,
    /// The value, absent when the backend holds nothing at the path.
    #[serde(default)]
    pub value: Option<TypedValue>,
}

/// Response to a point read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetResponse {
    /// Updates in backend order.
    #[serde(default)]
    pub updates: Vec<Update>,
}

impl GetResponse {
    /// The value of the first update, if the response carries one.
    ///
    /// Point reads address a single path, so later updates are ignored.
    pub fn first_value(self) -> Option<TypedValue> {
        self.updates.into_iter().next().and_then(|u| u.value)
    }
}

/// Request for a point write. The payload is forwarded untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetRequest {
    /// Root path the payload is written under.
    pub path: String,
    /// Raw request body.
    pub payload: Vec<u8>,
}

/// Response to a point write.
///
/// The result is loosely typed: it may be missing altogether, or present
/// but holding JSON `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetResponse {
    /// Backend-provided result document.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Change stream
// ---------------------------------------------------------------------------

/// Request opening the change-log stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListChangesRequest {
    /// When `false`, the backend sends its current backlog and closes.
    pub subscribe: bool,
}

/// Phase/state pair of a change record, as wire ordinals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStatus {
    /// Phase ordinal (`0` = change, `1` = rollback).
    #[serde(default)]
    pub phase: i32,
    /// State ordinal (`0` = pending, `1` = complete, `2` = failed).
    #[serde(default)]
    pub state: i32,
}

/// One change-log record: a network-wide transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Transaction identifier.
    #[serde(default)]
    pub id: String,
    /// Monotonic index assigned by the backend.
    #[serde(default)]
    pub index: u64,
    /// Revision of the record.
    #[serde(default)]
    pub revision: u64,
    /// Lifecycle status.
    #[serde(default)]
    pub status: Option<ChangeStatus>,
    /// Creation time.
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    /// Deletion time.
    #[serde(default)]
    pub deleted: Option<DateTime<Utc>>,
    /// User that submitted the change.
    #[serde(default)]
    pub username: Option<String>,
    /// Per-target deltas, in backend order.
    #[serde(default)]
    pub changes: Vec<TargetChange>,
}

/// The delta applied to one target within a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetChange {
    /// Target identifier.
    #[serde(default)]
    pub target_id: String,
    /// Target model type.
    #[serde(default)]
    pub target_type: String,
    /// Target model version.
    #[serde(default)]
    pub target_version: String,
    /// Changed values, in backend order.
    #[serde(default)]
    pub values: Vec<ChangedValue>,
}

/// A single path/value delta.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangedValue {
    /// Path of the changed leaf.
    #[serde(default)]
    pub path: String,
    /// New (or last-known, when removed) value.
    #[serde(default)]
    pub value: Option<TypedValue>,
    /// Whether the leaf was removed.
    #[serde(default)]
    pub removed: bool,
}
