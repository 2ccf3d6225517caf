//! Typed cyber-observable object properties.
//!
//! The `cybox-properties` crate models the typed properties used throughout
//! cyber-observable object descriptions (strings, integers, timestamps, URIs,
//! hex digests, …) together with their qualifying attributes: identity,
//! obfuscation and defanging markers, and pattern-matching metadata.
//!
//! A [`TypedProperty`] converts losslessly to and from two representations:
//!
//! - **tree-form**, a schema-bound element node ([`ObjectPropertyElement`] or
//!   any [`ObjectPropertyNode`]), and
//! - **map-form**, JSON, where a property without metadata collapses to its
//!   bare value.
//!
//! # Entry Point
//!
//! ```
//! use cybox_properties::{PropertyType, TypedProperty};
//! use serde_json::json;
//!
//! let size = TypedProperty::with_value(PropertyType::UnsignedLong, "1024")?;
//! assert_eq!(size.to_dict(), json!(1024));
//!
//! let element = size.to_obj();
//! let back = TypedProperty::from_binding(Some(&element))?;
//! assert_eq!(back.as_ref(), Some(&size));
//! # Ok::<(), cybox_properties::PropertyError>(())
//! ```
//!
//! # Features
//!
//! - `serde` (default): `Serialize`/`Deserialize` for the enumerations and
//!   a map-form `Serialize` impl for [`TypedProperty`].

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod binding;
pub mod error;
pub mod pattern;
pub mod property;
pub mod property_type;
pub mod serializer;
pub mod value;

pub use binding::{BindingType, ObjectPropertyElement, ObjectPropertyNode, PatternFieldNode};
pub use error::{PropertyError, Result};
pub use pattern::{ApplyCondition, Condition, PatternFields, PatternType};
pub use property::TypedProperty;
pub use property_type::PropertyType;
pub use serializer::tree::{denormalize_from_xml, normalize_to_xml};
pub use value::{PropertyValue, Scalar, Timestamp};
