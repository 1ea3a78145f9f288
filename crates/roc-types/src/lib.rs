//! Shared type definitions for the ROC gateway.
//!
//! Two families of types live here:
//!
//! - **Southbound records** -- what the configuration backend hands us:
//!   typed values from point reads and change-log records from the
//!   change stream. These are deliberately permissive (everything optional
//!   defaults to its zero value) so decoding never fails on a sparse record.
//! - **REST resources** -- what the gateway serves. Types here flow
//!   downstream to `TypeScript` via `ts-rs` for the web GUI.
//!
//! # Modules
//!
//! - [`value`] -- [`TypedValue`] sum type and its [`ValueKind`] tag
//! - [`southbound`] -- point-read, point-write and change-stream records
//! - [`rest`] -- target and transaction resources served over HTTP

pub mod rest;
pub mod southbound;
pub mod value;

// Re-export all public types at crate root for convenience.
pub use rest::{
    Change, ChangeValue, TargetName, Transaction, TransactionPhase, TransactionState,
    TransactionStatus,
};
pub use southbound::{
    ChangeRecord, ChangeStatus, ChangedValue, Encoding, GetRequest, GetResponse,
    ListChangesRequest, Path, SetRequest, SetResponse, TargetChange, Update,
};
pub use value::{TypedValue, ValueKind};
