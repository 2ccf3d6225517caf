//! Tree-form element bindings.
//!
//! An object property serializes to a schema-bound element whose type is a
//! [`BindingType`]. The element is reached through two accessor traits,
//! [`PatternFieldNode`] and [`ObjectPropertyNode`], so that any tree layer can
//! host properties; [`ObjectPropertyElement`] is the in-crate implementation.
//!
//! Text escaping is not the node's concern: the property layer hands it text
//! that has already gone through
//! [`normalize_to_xml`](crate::serializer::tree::normalize_to_xml).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::PropertyError;
use crate::property_type::PropertyType;

/// Schema element types that carry an object property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingType {
    /// `StringObjectPropertyType`.
    StringObjectPropertyType,
    /// `IntegerObjectPropertyType`.
    IntegerObjectPropertyType,
    /// `UnsignedLongObjectPropertyType`.
    UnsignedLongObjectPropertyType,
    /// `PositiveIntegerObjectPropertyType`.
    PositiveIntegerObjectPropertyType,
    /// `UnsignedIntegerObjectPropertyType`.
    UnsignedIntegerObjectPropertyType,
    /// `NonNegativeIntegerObjectPropertyType`.
    NonNegativeIntegerObjectPropertyType,
    /// `AnyURIObjectPropertyType`.
    AnyUriObjectPropertyType,
    /// `HexBinaryObjectPropertyType`.
    HexBinaryObjectPropertyType,
    /// `DurationObjectPropertyType`.
    DurationObjectPropertyType,
    /// `DateTimeObjectPropertyType`.
    DateTimeObjectPropertyType,
    /// `DoubleObjectPropertyType`.
    DoubleObjectPropertyType,
    /// `FloatObjectPropertyType`.
    FloatObjectPropertyType,
    /// `LongObjectPropertyType`.
    LongObjectPropertyType,
    /// `SimpleHashValueType`, a hash digest carried as hex text.
    SimpleHashValueType,
}

impl BindingType {
    /// Every element type, in declaration order.
    pub const ALL: [BindingType; 14] = [
        Self::StringObjectPropertyType,
        Self::IntegerObjectPropertyType,
        Self::UnsignedLongObjectPropertyType,
        Self::PositiveIntegerObjectPropertyType,
        Self::UnsignedIntegerObjectPropertyType,
        Self::NonNegativeIntegerObjectPropertyType,
        Self::AnyUriObjectPropertyType,
        Self::HexBinaryObjectPropertyType,
        Self::DurationObjectPropertyType,
        Self::DateTimeObjectPropertyType,
        Self::DoubleObjectPropertyType,
        Self::FloatObjectPropertyType,
        Self::LongObjectPropertyType,
        Self::SimpleHashValueType,
    ];

    /// Returns the schema type name, e.g. `"AnyURIObjectPropertyType"`.
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::StringObjectPropertyType => "StringObjectPropertyType",
            Self::IntegerObjectPropertyType => "IntegerObjectPropertyType",
            Self::UnsignedLongObjectPropertyType => "UnsignedLongObjectPropertyType",
            Self::PositiveIntegerObjectPropertyType => "PositiveIntegerObjectPropertyType",
            Self::UnsignedIntegerObjectPropertyType => "UnsignedIntegerObjectPropertyType",
            Self::NonNegativeIntegerObjectPropertyType => "NonNegativeIntegerObjectPropertyType",
            Self::AnyUriObjectPropertyType => "AnyURIObjectPropertyType",
            Self::HexBinaryObjectPropertyType => "HexBinaryObjectPropertyType",
            Self::DurationObjectPropertyType => "DurationObjectPropertyType",
            Self::DateTimeObjectPropertyType => "DateTimeObjectPropertyType",
            Self::DoubleObjectPropertyType => "DoubleObjectPropertyType",
            Self::FloatObjectPropertyType => "FloatObjectPropertyType",
            Self::LongObjectPropertyType => "LongObjectPropertyType",
            Self::SimpleHashValueType => "SimpleHashValueType",
        }
    }

    /// Resolves a schema type name, e.g. `"SimpleHashValueType"`.
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.type_name() == name)
    }
}

impl fmt::Display for BindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for BindingType {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_type_name(s).ok_or_else(|| PropertyError::UnknownDatatype(s.to_owned()))
    }
}

/// Returns the element type → datatype registry.
///
/// Built once on first use and never mutated afterwards. Every
/// [`PropertyType`] is reachable from its own [`BindingType`];
/// `SimpleHashValueType` additionally resolves to
/// [`PropertyType::HexBinary`].
#[must_use]
pub fn registry() -> &'static HashMap<BindingType, PropertyType> {
    static REGISTRY: OnceLock<HashMap<BindingType, PropertyType>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut m: HashMap<BindingType, PropertyType> = PropertyType::ALL
            .into_iter()
            .map(|kind| (kind.binding_type(), kind))
            .collect();
        m.insert(BindingType::SimpleHashValueType, PropertyType::HexBinary);
        m
    })
}

/// Accessors for the pattern-matching attributes of an element.
///
/// Enumerated attributes (`condition`, `apply_condition`, `pattern_type`)
/// are exchanged as their schema text.
pub trait PatternFieldNode {
    /// `condition` attribute.
    fn condition(&self) -> Option<&str>;
    /// Sets the `condition` attribute.
    fn set_condition(&mut self, condition: String);
    /// `apply_condition` attribute.
    fn apply_condition(&self) -> Option<&str>;
    /// Sets the `apply_condition` attribute.
    fn set_apply_condition(&mut self, apply_condition: String);
    /// `bit_mask` attribute.
    fn bit_mask(&self) -> Option<&str>;
    /// Sets the `bit_mask` attribute.
    fn set_bit_mask(&mut self, bit_mask: String);
    /// `pattern_type` attribute.
    fn pattern_type(&self) -> Option<&str>;
    /// Sets the `pattern_type` attribute.
    fn set_pattern_type(&mut self, pattern_type: String);
    /// `regex_syntax` attribute.
    fn regex_syntax(&self) -> Option<&str>;
    /// Sets the `regex_syntax` attribute.
    fn set_regex_syntax(&mut self, regex_syntax: String);
    /// `has_changed` attribute.
    fn has_changed(&self) -> Option<bool>;
    /// Sets the `has_changed` attribute.
    fn set_has_changed(&mut self, has_changed: bool);
    /// `trend` attribute.
    fn trend(&self) -> Option<bool>;
    /// Sets the `trend` attribute.
    fn set_trend(&mut self, trend: bool);
}

/// Accessors for an object property element: text content plus attributes.
pub trait ObjectPropertyNode: PatternFieldNode {
    /// The element type of this node.
    fn binding_type(&self) -> BindingType;
    /// Text content.
    fn value_of(&self) -> Option<&str>;
    /// Sets or clears the text content.
    fn set_value_of(&mut self, value: Option<String>);
    /// `datatype` attribute.
    fn datatype(&self) -> Option<&str>;
    /// Sets the `datatype` attribute.
    fn set_datatype(&mut self, datatype: String);
    /// `id` attribute.
    fn id(&self) -> Option<&str>;
    /// Sets the `id` attribute.
    fn set_id(&mut self, id: String);
    /// `idref` attribute.
    fn idref(&self) -> Option<&str>;
    /// Sets the `idref` attribute.
    fn set_idref(&mut self, idref: String);
    /// `appears_random` attribute.
    fn appears_random(&self) -> Option<bool>;
    /// Sets the `appears_random` attribute.
    fn set_appears_random(&mut self, appears_random: bool);
    /// `is_obfuscated` attribute.
    fn is_obfuscated(&self) -> Option<bool>;
    /// Sets the `is_obfuscated` attribute.
    fn set_is_obfuscated(&mut self, is_obfuscated: bool);
    /// `obfuscation_algorithm_ref` attribute.
    fn obfuscation_algorithm_ref(&self) -> Option<&str>;
    /// Sets the `obfuscation_algorithm_ref` attribute.
    fn set_obfuscation_algorithm_ref(&mut self, algorithm_ref: String);
    /// `is_defanged` attribute.
    fn is_defanged(&self) -> Option<bool>;
    /// Sets the `is_defanged` attribute.
    fn set_is_defanged(&mut self, is_defanged: bool);
    /// `defanging_algorithm_ref` attribute.
    fn defanging_algorithm_ref(&self) -> Option<&str>;
    /// Sets the `defanging_algorithm_ref` attribute.
    fn set_defanging_algorithm_ref(&mut self, algorithm_ref: String);
    /// `refanging_transform_type` attribute.
    fn refanging_transform_type(&self) -> Option<&str>;
    /// Sets the `refanging_transform_type` attribute.
    fn set_refanging_transform_type(&mut self, transform_type: String);
    /// `refanging_transform` attribute.
    fn refanging_transform(&self) -> Option<&str>;
    /// Sets the `refanging_transform` attribute.
    fn set_refanging_transform(&mut self, transform: String);
}

/// An object property element held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPropertyElement {
    binding: BindingType,
    value_of: Option<String>,
    datatype: Option<String>,
    id: Option<String>,
    idref: Option<String>,
    appears_random: Option<bool>,
    is_obfuscated: Option<bool>,
    obfuscation_algorithm_ref: Option<String>,
    is_defanged: Option<bool>,
    defanging_algorithm_ref: Option<String>,
    refanging_transform_type: Option<String>,
    refanging_transform: Option<String>,
    condition: Option<String>,
    apply_condition: Option<String>,
    bit_mask: Option<String>,
    pattern_type: Option<String>,
    regex_syntax: Option<String>,
    has_changed: Option<bool>,
    trend: Option<bool>,
}

impl ObjectPropertyElement {
    /// Creates an empty element of the given type.
    #[must_use]
    pub fn new(binding: BindingType) -> Self {
        Self {
            binding,
            value_of: None,
            datatype: None,
            id: None,
            idref: None,
            appears_random: None,
            is_obfuscated: None,
            obfuscation_algorithm_ref: None,
            is_defanged: None,
            defanging_algorithm_ref: None,
            refanging_transform_type: None,
            refanging_transform: None,
            condition: None,
            apply_condition: None,
            bit_mask: None,
            pattern_type: None,
            regex_syntax: None,
            has_changed: None,
            trend: None,
        }
    }

    /// Creates an element with text content.
    #[must_use]
    pub fn with_text(binding: BindingType, text: impl Into<String>) -> Self {
        let mut element = Self::new(binding);
        element.value_of = Some(text.into());
        element
    }

    /// Returns the attributes that are set, as `(name, text)` pairs in schema
    /// order. Unset attributes are absent.
    #[must_use]
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let flag = |v: Option<bool>| v.map(|b| b.to_string());
        let fields: [(&'static str, Option<String>); 17] = [
            ("id", self.id.clone()),
            ("idref", self.idref.clone()),
            ("datatype", self.datatype.clone()),
            ("appears_random", flag(self.appears_random)),
            ("is_obfuscated", flag(self.is_obfuscated)),
            ("obfuscation_algorithm_ref", self.obfuscation_algorithm_ref.clone()),
            ("is_defanged", flag(self.is_defanged)),
            ("defanging_algorithm_ref", self.defanging_algorithm_ref.clone()),
            ("refanging_transform_type", self.refanging_transform_type.clone()),
            ("refanging_transform", self.refanging_transform.clone()),
            ("condition", self.condition.clone()),
            ("apply_condition", self.apply_condition.clone()),
            ("bit_mask", self.bit_mask.clone()),
            ("pattern_type", self.pattern_type.clone()),
            ("regex_syntax", self.regex_syntax.clone()),
            ("has_changed", flag(self.has_changed)),
            ("trend", flag(self.trend)),
        ];
        fields
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect()
    }
}

macro_rules! text_accessors {
    ($($field:ident / $setter:ident),* $(,)?) => {
        $(
            fn $field(&self) -> Option<&str> {
                self.$field.as_deref()
            }

            fn $setter(&mut self, value: String) {
                self.$field = Some(value);
            }
        )*
    };
}

macro_rules! flag_accessors {
    ($($field:ident / $setter:ident),* $(,)?) => {
        $(
            fn $field(&self) -> Option<bool> {
                self.$field
            }

            fn $setter(&mut self, value: bool) {
                self.$field = Some(value);
            }
        )*
    };
}

impl PatternFieldNode for ObjectPropertyElement {
    text_accessors! {
        condition / set_condition,
        apply_condition / set_apply_condition,
        bit_mask / set_bit_mask,
        pattern_type / set_pattern_type,
        regex_syntax / set_regex_syntax,
    }

    flag_accessors! {
        has_changed / set_has_changed,
        trend / set_trend,
    }
}

impl ObjectPropertyNode for ObjectPropertyElement {
    fn binding_type(&self) -> BindingType {
        self.binding
    }

    fn value_of(&self) -> Option<&str> {
        self.value_of.as_deref()
    }

    fn set_value_of(&mut self, value: Option<String>) {
        self.value_of = value;
    }

    text_accessors! {
        datatype / set_datatype,
        id / set_id,
        idref / set_idref,
        obfuscation_algorithm_ref / set_obfuscation_algorithm_ref,
        defanging_algorithm_ref / set_defanging_algorithm_ref,
        refanging_transform_type / set_refanging_transform_type,
        refanging_transform / set_refanging_transform,
    }

    flag_accessors! {
        appears_random / set_appears_random,
        is_obfuscated / set_is_obfuscated,
        is_defanged / set_is_defanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_datatype() {
        for kind in PropertyType::ALL {
            assert_eq!(
                registry().get(&kind.binding_type()),
                Some(&kind),
                "{kind} is not reachable from its binding"
            );
        }
    }

    #[test]
    fn simple_hash_value_is_hex_binary() {
        assert_eq!(
            registry().get(&BindingType::SimpleHashValueType),
            Some(&PropertyType::HexBinary)
        );
    }

    #[test]
    fn every_binding_is_registered() {
        for binding in BindingType::ALL {
            assert!(registry().contains_key(&binding), "{binding} unregistered");
        }
        assert_eq!(registry().len(), BindingType::ALL.len());
    }

    #[test]
    fn type_names_round_trip() {
        for binding in BindingType::ALL {
            assert_eq!(binding.type_name().parse::<BindingType>(), Ok(binding));
        }
        assert!("ObjectPropertyType".parse::<BindingType>().is_err());
        assert_eq!(
            BindingType::from_type_name("AnyURIObjectPropertyType"),
            Some(BindingType::AnyUriObjectPropertyType)
        );
    }

    #[test]
    fn attributes_list_only_what_is_set() {
        let mut element = ObjectPropertyElement::new(BindingType::StringObjectPropertyType);
        assert!(element.attributes().is_empty());
        element.set_id("example:prop-1".to_owned());
        element.set_is_defanged(true);
        assert_eq!(
            element.attributes(),
            vec![
                ("id", "example:prop-1".to_owned()),
                ("is_defanged", "true".to_owned())
            ]
        );
    }
}
