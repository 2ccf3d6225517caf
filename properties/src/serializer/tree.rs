//! Tree-form serialization: properties to and from schema-bound elements.
//!
//! The element text is produced by [`normalize_to_xml`] and read back by
//! [`denormalize_from_xml`]; attributes are written only when set. The
//! `datatype` attribute is never written (the element type implies it) but is
//! read back when present.

use tracing::debug;

use crate::binding::{ObjectPropertyElement, ObjectPropertyNode};
use crate::error::{PropertyError, Result};
use crate::pattern::PatternFields;
use crate::property::TypedProperty;
use crate::property_type::PropertyType;
use crate::value::{PropertyValue, Scalar};

/// Separator between sequence items in element text.
pub const LIST_DELIMITER: char = ',';

/// Escape for a literal delimiter inside a sequence item.
pub const ESCAPED_DELIMITER: &str = "&comma;";

/// Renders a serialized value as element text.
///
/// Sequences are joined with `,`; commas inside items are escaped as
/// `&comma;`. XML character escaping is left to the tree layer.
#[must_use]
pub fn normalize_to_xml(value: Option<&PropertyValue>) -> Option<String> {
    Some(match value? {
        PropertyValue::Single(s) => escape_delimiter(&s.to_text()),
        PropertyValue::Multiple(items) => items
            .iter()
            .map(|s| escape_delimiter(&s.to_text()))
            .collect::<Vec<_>>()
            .join(","),
    })
}

/// Reads element text back into a raw value; the inverse of
/// [`normalize_to_xml`].
///
/// Text containing `,` becomes a sequence of text items.
#[must_use]
pub fn denormalize_from_xml(text: Option<&str>) -> Option<PropertyValue> {
    let text = text?;
    Some(if text.contains(LIST_DELIMITER) {
        PropertyValue::Multiple(
            text.split(LIST_DELIMITER)
                .map(|item| Scalar::Text(unescape_delimiter(item)))
                .collect(),
        )
    } else {
        PropertyValue::Single(Scalar::Text(unescape_delimiter(text)))
    })
}

fn escape_delimiter(text: &str) -> String {
    text.replace(LIST_DELIMITER, ESCAPED_DELIMITER)
}

fn unescape_delimiter(text: &str) -> String {
    text.replace(ESCAPED_DELIMITER, ",")
}

impl TypedProperty {
    /// Builds the tree-form element for this property.
    #[must_use]
    pub fn to_obj(&self) -> ObjectPropertyElement {
        let mut element = ObjectPropertyElement::new(self.kind().binding_type());
        self.write_obj(&mut element);
        element
    }

    /// Writes text content and the set attributes onto an existing node.
    pub fn write_obj<N: ObjectPropertyNode + ?Sized>(&self, node: &mut N) {
        node.set_value_of(normalize_to_xml(self.serialized_value().as_ref()));

        if let Some(id) = &self.id {
            node.set_id(id.clone());
        }
        if let Some(idref) = &self.idref {
            node.set_idref(idref.clone());
        }
        if let Some(appears_random) = self.appears_random {
            node.set_appears_random(appears_random);
        }
        if let Some(is_obfuscated) = self.is_obfuscated {
            node.set_is_obfuscated(is_obfuscated);
        }
        if let Some(algorithm) = &self.obfuscation_algorithm_ref {
            node.set_obfuscation_algorithm_ref(algorithm.clone());
        }
        if let Some(is_defanged) = self.is_defanged {
            node.set_is_defanged(is_defanged);
        }
        if let Some(algorithm) = &self.defanging_algorithm_ref {
            node.set_defanging_algorithm_ref(algorithm.clone());
        }
        if let Some(transform_type) = &self.refanging_transform_type {
            node.set_refanging_transform_type(transform_type.clone());
        }
        if let Some(transform) = &self.refanging_transform {
            node.set_refanging_transform(transform.clone());
        }

        self.pattern.to_obj(node);
    }

    /// Rebuilds a property of datatype `kind` from a node.
    ///
    /// An absent node yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::ValueConversion`] if the element text cannot
    /// be coerced to `kind`.
    pub fn from_obj<N: ObjectPropertyNode + ?Sized>(
        kind: PropertyType,
        node: Option<&N>,
    ) -> Result<Option<Self>> {
        let Some(node) = node else {
            return Ok(None);
        };
        let mut property = Self::new(kind);
        property.set_value(denormalize_from_xml(node.value_of()))?;

        property.id = node.id().map(str::to_owned);
        property.idref = node.idref().map(str::to_owned);
        property.set_datatype(node.datatype().map(str::to_owned));
        property.appears_random = node.appears_random();
        property.is_obfuscated = node.is_obfuscated();
        property.obfuscation_algorithm_ref = node.obfuscation_algorithm_ref().map(str::to_owned);
        property.is_defanged = node.is_defanged();
        property.defanging_algorithm_ref = node.defanging_algorithm_ref().map(str::to_owned);
        property.refanging_transform_type = node.refanging_transform_type().map(str::to_owned);
        property.refanging_transform = node.refanging_transform().map(str::to_owned);

        property.pattern = PatternFields::from_obj(node);

        Ok(Some(property))
    }

    /// Rebuilds a property from a node, picking the datatype from the node's
    /// own element type through the registry.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::UnknownDatatype`] if the element type is not
    /// registered, or [`PropertyError::ValueConversion`] as for
    /// [`TypedProperty::from_obj`].
    pub fn from_binding<N: ObjectPropertyNode + ?Sized>(node: Option<&N>) -> Result<Option<Self>> {
        let Some(node) = node else {
            return Ok(None);
        };
        let binding = node.binding_type();
        let kind = PropertyType::for_binding(binding)
            .ok_or_else(|| PropertyError::UnknownDatatype(binding.type_name().to_owned()))?;
        debug!(binding = binding.type_name(), datatype = kind.tag(), "dispatching element");
        Self::from_obj(kind, Some(node))
    }
}
