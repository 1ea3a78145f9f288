//! Dynamically-typed backend values.
//!
//! The backend answers point reads with a tagged union of scalar and list
//! kinds. [`TypedValue`] models that union explicitly so every consumer has
//! to match on the kind instead of downcasting an opaque value.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// A single typed value as returned by the configuration backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    /// UTF-8 string scalar.
    String(String),
    /// Signed integer scalar.
    Int(i64),
    /// Unsigned integer scalar.
    Uint(u64),
    /// Boolean scalar.
    Bool(bool),
    /// Floating point scalar.
    Float(f64),
    /// Opaque byte string.
    Bytes(Vec<u8>),
    /// Ordered list of scalars (a leaf-list).
    LeafList(Vec<TypedValue>),
    /// Explicitly empty value.
    Empty,
}

/// The dynamic kind tag of a [`TypedValue`].
///
/// Carried by decode errors so a mismatch can be diagnosed without
/// logging the (possibly large) value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// [`TypedValue::String`]
    String,
    /// [`TypedValue::Int`]
    Int,
    /// [`TypedValue::Uint`]
    Uint,
    /// [`TypedValue::Bool`]
    Bool,
    /// [`TypedValue::Float`]
    Float,
    /// [`TypedValue::Bytes`]
    Bytes,
    /// [`TypedValue::LeafList`]
    LeafList,
    /// [`TypedValue::Empty`]
    Empty,
}

impl TypedValue {
    /// Return the dynamic kind tag of this value.
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::Int(_) => ValueKind::Int,
            Self::Uint(_) => ValueKind::Uint,
            Self::Bool(_) => ValueKind::Bool,
            Self::Float(_) => ValueKind::Float,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::LeafList(_) => ValueKind::LeafList,
            Self::Empty => ValueKind::Empty,
        }
    }
}

/// Canonical textual projection of a value.
///
/// Strings are emitted verbatim, bytes as standard base64, leaf-lists as
/// their elements joined with `,`, and [`TypedValue::Empty`] as the empty
/// string. The projection is lossy: `Int(1)` and `String("1")` render alike.
impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bytes(bytes) => f.write_str(&STANDARD.encode(bytes)),
            Self::LeafList(elements) => {
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{element}")?;
                }
                Ok(())
            }
            Self::Empty => Ok(()),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::String => "string_val",
            Self::Int => "int_val",
            Self::Uint => "uint_val",
            Self::Bool => "bool_val",
            Self::Float => "float_val",
            Self::Bytes => "bytes_val",
            Self::LeafList => "leaflist_val",
            Self::Empty => "empty",
        };
        f.write_str(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_render_canonically() {
        assert_eq!(TypedValue::String("enb-1".to_owned()).to_string(), "enb-1");
        assert_eq!(TypedValue::Int(-7).to_string(), "-7");
        assert_eq!(TypedValue::Uint(42).to_string(), "42");
        assert_eq!(TypedValue::Bool(true).to_string(), "true");
        assert_eq!(TypedValue::Float(1.5).to_string(), "1.5");
        assert_eq!(TypedValue::Empty.to_string(), "");
    }

    #[test]
    fn bytes_render_as_base64() {
        let value = TypedValue::Bytes(b"roc".to_vec());
        assert_eq!(value.to_string(), "cm9j");
    }

    #[test]
    fn leaf_list_joins_elements() {
        let value = TypedValue::LeafList(vec![
            TypedValue::String("a".to_owned()),
            TypedValue::Uint(2),
            TypedValue::Bool(false),
        ]);
        assert_eq!(value.to_string(), "a,2,false");
        assert_eq!(TypedValue::LeafList(Vec::new()).to_string(), "");
    }

    #[test]
    fn kind_tags_name_the_variant() {
        assert_eq!(TypedValue::Int(1).kind(), ValueKind::Int);
        assert_eq!(TypedValue::LeafList(Vec::new()).kind(), ValueKind::LeafList);
        assert_eq!(ValueKind::String.to_string(), "string_val");
        assert_eq!(ValueKind::LeafList.to_string(), "leaflist_val");
    }

    #[test]
    fn adjacently_tagged_yaml_form() {
        let yaml = "kind: leaf_list\nvalue:\n  - kind: string\n    value: starbucks\n  - kind: empty\n";
        let value: TypedValue = serde_yml::from_str(yaml).unwrap_or(TypedValue::Empty);
        assert_eq!(
            value,
            TypedValue::LeafList(vec![
                TypedValue::String("starbucks".to_owned()),
                TypedValue::Empty,
            ])
        );
    }
}
