//! Absence gate for loosely-typed results.
//!
//! A result can be absent at more than one level: the outer wrapper may be
//! empty, or it may be present while holding a null payload (for example
//! `Some(Value::Null)` from a point write). [`Presence`] unwraps every
//! wrapper and asks the payload itself, so such a boxed absence is caught
//! and served as 404. A present but empty collection is served as 200.
//!
//! Every handler that returns a backend-derived result goes through
//! [`respond`].

use axum::Json;
use roc_southbound::Lookup;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;

/// A value that may turn out to be absent once unwrapped.
pub trait Presence {
    /// The payload type when present.
    type Present;

    /// The payload, or `None` if the value, or anything it wraps, is absent.
    fn into_present(self) -> Option<Self::Present>;
}

impl Presence for serde_json::Value {
    type Present = Self;

    fn into_present(self) -> Option<Self> {
        if self.is_null() { None } else { Some(self) }
    }
}

impl<T> Presence for Vec<T> {
    type Present = Self;

    fn into_present(self) -> Option<Self> {
        Some(self)
    }
}

impl<T: Presence> Presence for Option<T> {
    type Present = T::Present;

    fn into_present(self) -> Option<Self::Present> {
        self.and_then(Presence::into_present)
    }
}

impl<T: Presence> Presence for Lookup<T> {
    type Present = T::Present;

    fn into_present(self) -> Option<Self::Present> {
        self.into_option().and_then(Presence::into_present)
    }
}

/// Serve `value` as JSON, or 404 if it is absent.
///
/// `resource` names what was looked up, for the 404 message.
pub fn respond<T>(value: T, resource: &str) -> Result<Json<T::Present>, ApiError>
where
    T: Presence,
    T::Present: Serialize,
{
    value.into_present().map(Json).ok_or_else(|| {
        debug!(resource, "result absent");
        ApiError::NotFound(resource.to_owned())
    })
}
