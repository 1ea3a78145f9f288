//! Southbound side of the ROC gateway.
//!
//! Everything between the HTTP handlers and the configuration backend:
//!
//! - [`client`] -- the [`ConfigBackend`] facade trait and the
//!   deadline-scoped [`Southbound`] handle handlers call into.
//! - [`decode`] -- typed value decoding into REST resources, returning
//!   [`Lookup`] so an absent value can never pass for an empty one.
//! - [`changelog`] -- the bounded, cancellable [`ChangeLog`] reader that
//!   materializes the change stream into [`Transaction`]s.
//! - [`memory`] -- [`MemoryBackend`], an in-process backend used by tests
//!   and local runs.
//! - [`error`] -- [`SouthboundError`].
//!
//! The backend's own wire protocol is not implemented here; a real
//! deployment supplies a [`ConfigBackend`] over its RPC transport.
//!
//! [`Transaction`]: roc_types::Transaction

pub mod changelog;
pub mod client;
pub mod decode;
pub mod error;
pub mod memory;

pub use changelog::ChangeLog;
pub use client::{ChangeStream, ConfigBackend, Southbound};
pub use decode::{Lookup, decode_target_names};
pub use error::SouthboundError;
pub use memory::{MemoryBackend, MemorySnapshot, SnapshotError};
