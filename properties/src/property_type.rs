//! The closed set of property datatypes.
//!
//! Each [`PropertyType`] fixes three things for a [`TypedProperty`]:
//! the datatype tag, the [`BindingType`] of its tree-form element, and the
//! parse/serialize rules applied to its value.
//!
//! [`TypedProperty`]: crate::TypedProperty

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::binding::{self, BindingType};
use crate::error::{PropertyError, Result};
use crate::value::{PropertyValue, Scalar, Timestamp};

/// A property datatype (one variant of a typed property).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum PropertyType {
    /// `xs:string`.
    String,
    /// `xs:integer`.
    Integer,
    /// `xs:unsignedLong`.
    UnsignedLong,
    /// `xs:positiveInteger`.
    PositiveInteger,
    /// `xs:unsignedInt`.
    #[cfg_attr(feature = "serde", serde(rename = "unsignedInt"))]
    UnsignedInteger,
    /// `xs:nonNegativeInteger`.
    NonNegativeInteger,
    /// `xs:anyURI`.
    #[cfg_attr(feature = "serde", serde(rename = "anyURI"))]
    AnyUri,
    /// `xs:hexBinary`, stored as its hex text.
    HexBinary,
    /// `xs:duration`, stored as its ISO 8601 text.
    Duration,
    /// `xs:dateTime`.
    DateTime,
    /// `xs:double`.
    Double,
    /// `xs:float`.
    Float,
    /// `xs:long`.
    Long,
}

impl PropertyType {
    /// Every datatype, in declaration order.
    pub const ALL: [PropertyType; 13] = [
        Self::String,
        Self::Integer,
        Self::UnsignedLong,
        Self::PositiveInteger,
        Self::UnsignedInteger,
        Self::NonNegativeInteger,
        Self::AnyUri,
        Self::HexBinary,
        Self::Duration,
        Self::DateTime,
        Self::Double,
        Self::Float,
        Self::Long,
    ];

    /// Returns the datatype tag (e.g. `"unsignedLong"`).
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::UnsignedLong => "unsignedLong",
            Self::PositiveInteger => "positiveInteger",
            Self::UnsignedInteger => "unsignedInt",
            Self::NonNegativeInteger => "nonNegativeInteger",
            Self::AnyUri => "anyURI",
            Self::HexBinary => "hexBinary",
            Self::Duration => "duration",
            Self::DateTime => "dateTime",
            Self::Double => "double",
            Self::Float => "float",
            Self::Long => "long",
        }
    }

    /// Returns the element type this datatype serializes to in tree-form.
    #[must_use]
    pub fn binding_type(self) -> BindingType {
        match self {
            Self::String => BindingType::StringObjectPropertyType,
            Self::Integer => BindingType::IntegerObjectPropertyType,
            Self::UnsignedLong => BindingType::UnsignedLongObjectPropertyType,
            Self::PositiveInteger => BindingType::PositiveIntegerObjectPropertyType,
            Self::UnsignedInteger => BindingType::UnsignedIntegerObjectPropertyType,
            Self::NonNegativeInteger => BindingType::NonNegativeIntegerObjectPropertyType,
            Self::AnyUri => BindingType::AnyUriObjectPropertyType,
            Self::HexBinary => BindingType::HexBinaryObjectPropertyType,
            Self::Duration => BindingType::DurationObjectPropertyType,
            Self::DateTime => BindingType::DateTimeObjectPropertyType,
            Self::Double => BindingType::DoubleObjectPropertyType,
            Self::Float => BindingType::FloatObjectPropertyType,
            Self::Long => BindingType::LongObjectPropertyType,
        }
    }

    /// Resolves the datatype bound to an element type.
    ///
    /// Several element types may share a datatype: `SimpleHashValueType`
    /// resolves to [`PropertyType::HexBinary`].
    #[must_use]
    pub fn for_binding(binding: BindingType) -> Option<Self> {
        let found = binding::registry().get(&binding).copied();
        debug!(binding = binding.type_name(), datatype = ?found, "binding lookup");
        found
    }

    /// Whether values are coerced to integers.
    #[must_use]
    pub fn is_integer_family(self) -> bool {
        matches!(
            self,
            Self::Integer
                | Self::UnsignedLong
                | Self::PositiveInteger
                | Self::UnsignedInteger
                | Self::NonNegativeInteger
        )
    }

    /// Coerces a raw value into this datatype's canonical representation.
    ///
    /// Sequences are coerced element by element. A dateTime sequence may not
    /// hold empty elements: a lone empty value clears the property, but an
    /// empty item inside a sequence is a [`PropertyError::ValueConversion`].
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::ValueConversion`] if an element cannot be
    /// represented in this datatype.
    pub fn parse(self, value: Option<PropertyValue>) -> Result<Option<PropertyValue>> {
        let Some(value) = value else {
            return Ok(None);
        };
        match self {
            _ if self.is_integer_family() => {
                value.try_map(|s| parse_integer(self, s)).map(Some)
            }
            Self::DateTime => match value {
                PropertyValue::Single(s) => Ok(parse_timestamp(s)?.map(PropertyValue::Single)),
                PropertyValue::Multiple(items) => {
                    let mut parsed = Vec::with_capacity(items.len());
                    for item in items {
                        match parse_timestamp(item)? {
                            Some(s) => parsed.push(s),
                            None => {
                                return Err(PropertyError::conversion(
                                    self.tag(),
                                    "",
                                    "empty element in dateTime sequence",
                                ))
                            }
                        }
                    }
                    Ok(Some(PropertyValue::Multiple(parsed)))
                }
            },
            _ => Ok(Some(value)),
        }
    }

    /// Formats a canonical value for emission.
    ///
    /// Identity for every datatype except [`PropertyType::DateTime`], which
    /// renders timestamps as ISO 8601 text.
    #[must_use]
    pub fn serialize(self, value: Option<&PropertyValue>) -> Option<PropertyValue> {
        let value = value?;
        match (self, value) {
            (Self::DateTime, PropertyValue::Single(s)) if s.is_falsy() => None,
            (Self::DateTime, PropertyValue::Single(s)) => {
                Some(PropertyValue::Single(format_timestamp(s)))
            }
            (Self::DateTime, PropertyValue::Multiple(items)) => Some(PropertyValue::Multiple(
                items.iter().map(format_timestamp).collect(),
            )),
            _ => Some(value.clone()),
        }
    }
}

fn format_timestamp(scalar: &Scalar) -> Scalar {
    match scalar {
        Scalar::DateTime(ts) => Scalar::Text(ts.to_iso8601()),
        other => other.clone(),
    }
}

fn parse_integer(kind: PropertyType, scalar: Scalar) -> Result<Scalar> {
    match scalar {
        Scalar::Integer(_) => Ok(scalar),
        Scalar::Boolean(b) => Ok(Scalar::Integer(i128::from(b))),
        Scalar::Text(text) => text
            .trim()
            .parse::<i128>()
            .map(Scalar::Integer)
            .map_err(|e| PropertyError::conversion(kind.tag(), text, e.to_string())),
        Scalar::Float(f) if f.is_finite() => {
            let truncated = f.trunc();
            if truncated.abs() < 1.7e38 {
                Ok(Scalar::Integer(truncated as i128))
            } else {
                Err(PropertyError::conversion(kind.tag(), f.to_string(), "out of range"))
            }
        }
        Scalar::Float(f) => Err(PropertyError::conversion(
            kind.tag(),
            f.to_string(),
            "not a finite number",
        )),
        Scalar::DateTime(ts) => Err(PropertyError::conversion(
            kind.tag(),
            ts.to_iso8601(),
            "a timestamp is not an integer",
        )),
    }
}

fn parse_timestamp(scalar: Scalar) -> Result<Option<Scalar>> {
    if scalar.is_falsy() {
        return Ok(None);
    }
    match scalar {
        Scalar::DateTime(_) => Ok(Some(scalar)),
        Scalar::Text(text) => Timestamp::parse(&text)
            .map(|ts| Some(Scalar::DateTime(ts)))
            .ok_or_else(|| {
                PropertyError::conversion(
                    PropertyType::DateTime.tag(),
                    text,
                    "unrecognised date/time format",
                )
            }),
        other => Err(PropertyError::conversion(
            PropertyType::DateTime.tag(),
            other.to_text(),
            format!("a {} is not a date/time", other.kind_name()),
        )),
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PropertyType {
    type Err = PropertyError;

    /// Accepts a datatype tag (`"dateTime"`) or an element type name
    /// (`"DateTimeObjectPropertyType"`).
    fn from_str(s: &str) -> Result<Self> {
        if let Some(kind) = Self::ALL.into_iter().find(|k| k.tag() == s) {
            return Ok(kind);
        }
        BindingType::from_type_name(s)
            .and_then(Self::for_binding)
            .ok_or_else(|| PropertyError::UnknownDatatype(s.to_owned()))
    }
}
