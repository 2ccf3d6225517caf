//! Error types for property construction and deserialization.

use thiserror::Error;

/// Errors raised while building or reading a typed property.
///
/// Absent input to [`from_obj`](crate::TypedProperty::from_obj) or
/// [`from_dict`](crate::TypedProperty::from_dict) is not an error: both
/// return `Ok(None)` so callers can tell "no property" from "empty property".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PropertyError {
    /// A raw value could not be coerced into the variant's canonical type.
    #[error("cannot convert {value:?} to {datatype}: {reason}")]
    ValueConversion {
        /// Datatype tag of the variant doing the coercion.
        datatype: &'static str,
        /// Rendering of the offending input.
        value: String,
        /// Why the conversion failed.
        reason: String,
    },
    /// A datatype tag or binding type name was not recognised.
    #[error("unknown property datatype: {0}")]
    UnknownDatatype(String),
    /// Text does not name a member of a schema enumeration.
    #[error("{value:?} is not a valid {kind}")]
    UnknownEnumeration {
        /// Name of the enumeration.
        kind: &'static str,
        /// The unrecognised text.
        value: String,
    },
}

impl PropertyError {
    pub(crate) fn conversion(
        datatype: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ValueConversion {
            datatype,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = PropertyError> = std::result::Result<T, E>;
