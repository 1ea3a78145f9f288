//! Typed value decoding.
//!
//! Point reads return a [`TypedValue`] of any kind. Decoders here check the
//! dynamic kind before extracting anything and fail with
//! [`SouthboundError::TypeMismatch`] otherwise. The result is a [`Lookup`],
//! keeping "nothing was there" apart from "an empty list was there".

use roc_types::{TargetName, TypedValue, ValueKind};

use crate::error::SouthboundError;

/// Outcome of a decode: either something was retrieved, or nothing was.
///
/// `Found(vec![])` is a successful read of an empty collection and must be
/// served as such; only `Absent` means not found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// A value was retrieved (possibly empty).
    Found(T),
    /// Nothing was retrieved.
    Absent,
}

impl<T> Lookup<T> {
    /// Whether nothing was retrieved.
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Convert into an [`Option`], `Absent` becoming `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Absent => None,
        }
    }

    /// Map the found value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::Absent => Lookup::Absent,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Found)
    }
}

/// Decode a point-read value holding a leaf-list into target names.
///
/// Each element is rendered with its canonical string form, in backend
/// order. An empty leaf-list yields `Found(vec![])`.
///
/// # Errors
///
/// Returns [`SouthboundError::TypeMismatch`] carrying the received kind if
/// the value is anything but a leaf-list.
pub fn decode_target_names(
    value: Option<TypedValue>,
) -> Result<Lookup<Vec<TargetName>>, SouthboundError> {
    let Some(value) = value else {
        return Ok(Lookup::Absent);
    };
    match value {
        TypedValue::LeafList(elements) => Ok(Lookup::Found(
            elements
                .iter()
                .map(|element| TargetName {
                    name: element.to_string(),
                })
                .collect(),
        )),
        other @ (TypedValue::String(_)
        | TypedValue::Int(_)
        | TypedValue::Uint(_)
        | TypedValue::Bool(_)
        | TypedValue::Float(_)
        | TypedValue::Bytes(_)
        | TypedValue::Empty) => Err(SouthboundError::TypeMismatch {
            expected: ValueKind::LeafList,
            received: other.kind(),
        }),
    }
}
