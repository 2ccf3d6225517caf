//! Serialization forms for typed properties.
//!
//! Two forms are supported:
//! - **Tree-form** ([`tree`]): a schema-bound element node with text content
//!   and attributes.
//! - **Map-form** ([`map`]): JSON, collapsing to the bare value when the
//!   property carries no metadata.

pub mod map;
pub mod tree;
