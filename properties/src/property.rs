//! The typed property value holder.

use std::fmt;

use tracing::debug;

use crate::error::{PropertyError, Result};
use crate::pattern::PatternFields;
use crate::property_type::PropertyType;
use crate::value::{PropertyValue, Scalar};

/// A cyber-observable object property: a typed value plus qualifying
/// attributes.
///
/// The value is private so that every assignment goes through the
/// datatype's coercion; see [`TypedProperty::set_value`].
#[derive(Debug, Clone)]
pub struct TypedProperty {
    kind: PropertyType,
    value: Option<PropertyValue>,
    datatype: Option<String>,
    /// Identifier of this property.
    pub id: Option<String>,
    /// Reference to another property's `id`.
    pub idref: Option<String>,
    /// Whether the value appears to be random.
    pub appears_random: Option<bool>,
    /// Whether the value is obfuscated.
    pub is_obfuscated: Option<bool>,
    /// Reference to the obfuscation algorithm.
    pub obfuscation_algorithm_ref: Option<String>,
    /// Whether the value is defanged.
    pub is_defanged: Option<bool>,
    /// Reference to the defanging algorithm.
    pub defanging_algorithm_ref: Option<String>,
    /// Type of the refanging transform (e.g. a regex dialect).
    pub refanging_transform_type: Option<String>,
    /// The refanging transform itself.
    pub refanging_transform: Option<String>,
    /// Pattern-matching attributes.
    pub pattern: PatternFields,
}

impl TypedProperty {
    /// Creates a property of the given datatype with no value.
    #[must_use]
    pub fn new(kind: PropertyType) -> Self {
        Self {
            kind,
            value: None,
            datatype: Some(kind.tag().to_owned()),
            id: None,
            idref: None,
            appears_random: None,
            is_obfuscated: None,
            obfuscation_algorithm_ref: None,
            is_defanged: None,
            defanging_algorithm_ref: None,
            refanging_transform_type: None,
            refanging_transform: None,
            pattern: PatternFields::default(),
        }
    }

    /// Creates a property holding `value`, coerced for the datatype.
    ///
    /// ```
    /// use cybox_properties::{PropertyType, PropertyValue, TypedProperty};
    ///
    /// let port = TypedProperty::with_value(PropertyType::Integer, "42")?;
    /// assert_eq!(port.value(), Some(&PropertyValue::from(42_i64)));
    /// # Ok::<(), cybox_properties::PropertyError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::ValueConversion`] if `value` cannot be
    /// represented in `kind`.
    pub fn with_value(kind: PropertyType, value: impl Into<PropertyValue>) -> Result<Self> {
        let mut property = Self::new(kind);
        property.set_value(Some(value.into()))?;
        Ok(property)
    }

    /// Sets the `id` attribute, builder style.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the `idref` attribute, builder style.
    #[must_use]
    pub fn with_idref(mut self, idref: impl Into<String>) -> Self {
        self.idref = Some(idref.into());
        self
    }

    /// The datatype this property was built as.
    #[must_use]
    pub fn kind(&self) -> PropertyType {
        self.kind
    }

    /// The canonical value.
    #[must_use]
    pub fn value(&self) -> Option<&PropertyValue> {
        self.value.as_ref()
    }

    /// Replaces the value, coercing it for this datatype.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::ValueConversion`] if the value cannot be
    /// represented in this datatype; the previous value is kept.
    pub fn set_value(&mut self, value: Option<PropertyValue>) -> Result<()> {
        let kind = self.kind;
        self.value = kind.parse(value).inspect_err(|e| {
            debug!(datatype = kind.tag(), error = %e, "value coercion failed");
        })?;
        Ok(())
    }

    /// The datatype tag.
    ///
    /// Starts as the variant's tag; deserialization overwrites it with
    /// whatever the source carried, which may be nothing.
    #[must_use]
    pub fn datatype(&self) -> Option<&str> {
        self.datatype.as_deref()
    }

    pub(crate) fn set_datatype(&mut self, datatype: Option<String>) {
        self.datatype = datatype;
    }

    /// The value as it is emitted by both serialization forms.
    #[must_use]
    pub fn serialized_value(&self) -> Option<PropertyValue> {
        self.kind.serialize(self.value.as_ref())
    }

    /// Whether the property can be written as its bare value.
    ///
    /// True when nothing but `value` and `datatype` is set; the datatype is
    /// implied by the variant and so carries no extra information.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.id.is_none()
            && self.idref.is_none()
            && self.appears_random.is_none()
            && self.is_obfuscated.is_none()
            && self.obfuscation_algorithm_ref.is_none()
            && self.is_defanged.is_none()
            && self.defanging_algorithm_ref.is_none()
            && self.refanging_transform_type.is_none()
            && self.refanging_transform.is_none()
            && self.pattern.is_plain()
    }

    /// Whether the property has anything worth emitting.
    ///
    /// False only for a plain property without a value.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.is_plain() || self.value.is_some()
    }

    /// Compares against a bare value.
    ///
    /// This comparison is asymmetric and not an operator: it is
    /// true only when the property is plain and its canonical value equals
    /// `other` exactly as given. `other` is not coerced, so an `Integer`
    /// property holding 42 does not equal the text `"42"`.
    #[must_use]
    pub fn equals_value(&self, other: impl Into<PropertyValue>) -> bool {
        self.is_plain() && self.value.as_ref() == Some(&other.into())
    }

    /// The serialized value as an integer.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::ValueConversion`] if the value is absent, a
    /// sequence, or not integral.
    pub fn as_integer(&self) -> Result<i128> {
        let not_integer = |reason: &str| {
            PropertyError::conversion(
                PropertyType::Integer.tag(),
                self.to_string(),
                reason.to_owned(),
            )
        };
        match self.serialized_value() {
            Some(PropertyValue::Single(Scalar::Integer(i))) => Ok(i),
            Some(PropertyValue::Single(Scalar::Text(text))) => text
                .trim()
                .parse()
                .map_err(|_| not_integer("text is not an integer")),
            Some(PropertyValue::Single(_)) => Err(not_integer("value is not integral")),
            Some(PropertyValue::Multiple(_)) => Err(not_integer("value is a sequence")),
            None => Err(not_integer("no value")),
        }
    }
}

/// Full equality: same variant, same value, same attributes.
///
/// The `datatype` tag is not compared: it is implied by the variant, and
/// deserialization may leave it unset.
impl PartialEq for TypedProperty {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.value == other.value
            && self.id == other.id
            && self.idref == other.idref
            && self.appears_random == other.appears_random
            && self.is_obfuscated == other.is_obfuscated
            && self.obfuscation_algorithm_ref == other.obfuscation_algorithm_ref
            && self.is_defanged == other.is_defanged
            && self.defanging_algorithm_ref == other.defanging_algorithm_ref
            && self.refanging_transform_type == other.refanging_transform_type
            && self.refanging_transform == other.refanging_transform
            && self.pattern.fields_equal(&other.pattern)
    }
}

/// Prints the serialized value; an absent value prints nothing.
impl fmt::Display for TypedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.serialized_value() {
            Some(value) => write!(f, "{value}"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Condition;
    use crate::value::Timestamp;

    #[test]
    fn constructor_sets_datatype_tag() {
        for kind in PropertyType::ALL {
            assert_eq!(TypedProperty::new(kind).datatype(), Some(kind.tag()));
        }
    }

    #[test]
    fn integer_coerces_text() {
        let p = TypedProperty::with_value(PropertyType::Integer, "42").expect("integer");
        assert_eq!(p.value(), Some(&PropertyValue::from(42_i64)));
    }

    #[test]
    fn integer_rejects_text() {
        let err = TypedProperty::with_value(PropertyType::Integer, "not-a-number")
            .expect_err("must fail");
        assert!(matches!(err, PropertyError::ValueConversion { .. }));
    }

    #[test]
    fn failed_assignment_keeps_previous_value() {
        let mut p = TypedProperty::with_value(PropertyType::Integer, 5_i64).expect("integer");
        assert!(p.set_value(Some("five".into())).is_err());
        assert_eq!(p.value(), Some(&PropertyValue::from(5_i64)));
    }

    #[test]
    fn datetime_none_is_none() {
        let mut p = TypedProperty::new(PropertyType::DateTime);
        p.set_value(None).expect("none is fine");
        assert_eq!(p.value(), None);
    }

    #[test]
    fn datetime_rejects_garbage() {
        assert!(TypedProperty::with_value(PropertyType::DateTime, "not-a-date").is_err());
    }

    #[test]
    fn datetime_keeps_typed_timestamps() {
        let ts = Timestamp::parse("2014-01-31T06:14:46+00:00").expect("timestamp");
        let p = TypedProperty::with_value(PropertyType::DateTime, ts).expect("datetime");
        assert_eq!(p.value(), Some(&PropertyValue::from(ts)));
        assert_eq!(p.to_string(), "2014-01-31T06:14:46+00:00");
    }

    #[test]
    fn plain_property_equals_bare_value() {
        let p = TypedProperty::with_value(PropertyType::String, "x").expect("string");
        assert!(p.equals_value("x"));
        assert!(!p.equals_value("y"));
    }

    #[test]
    fn non_plain_property_never_equals_bare_value() {
        let p = TypedProperty::with_value(PropertyType::String, "x")
            .expect("string")
            .with_id("example:1");
        assert!(!p.equals_value("x"));
    }

    #[test]
    fn bare_comparison_does_not_coerce() {
        let p = TypedProperty::with_value(PropertyType::Integer, 42_i64).expect("integer");
        assert!(p.equals_value(42_i64));
        assert!(!p.equals_value("42"));
    }

    #[test]
    fn equality_ignores_datatype_tag() {
        let a = TypedProperty::with_value(PropertyType::String, "x").expect("string");
        let mut b = a.clone();
        b.set_datatype(None);
        assert_eq!(a, b);
    }

    #[test]
    fn equality_compares_variant() {
        let a = TypedProperty::with_value(PropertyType::String, "x").expect("string");
        let b = TypedProperty::with_value(PropertyType::AnyUri, "x").expect("uri");
        assert_ne!(a, b);
    }

    #[test]
    fn equality_compares_metadata() {
        let a = TypedProperty::with_value(PropertyType::String, "x").expect("string");
        let mut b = a.clone();
        b.is_defanged = Some(true);
        assert_ne!(a, b);
        let mut c = a.clone();
        c.pattern.condition = Some(Condition::Contains);
        assert_ne!(a, c);
    }

    #[test]
    fn content_predicate() {
        let empty = TypedProperty::new(PropertyType::String);
        assert!(!empty.has_content());
        let mut flagged = TypedProperty::new(PropertyType::String);
        flagged.is_obfuscated = Some(false);
        assert!(flagged.has_content());
        let valued = TypedProperty::with_value(PropertyType::String, "").expect("string");
        assert!(valued.has_content());
    }

    #[test]
    fn pattern_fields_affect_plainness() {
        let mut p = TypedProperty::with_value(PropertyType::String, "x").expect("string");
        assert!(p.is_plain());
        p.pattern.condition = Some(Condition::Equals);
        assert!(!p.is_plain());
    }

    #[test]
    fn integer_view() {
        let n = TypedProperty::with_value(PropertyType::UnsignedLong, "18446744073709551615")
            .expect("unsigned long");
        assert_eq!(n.as_integer(), Ok(i128::from(u64::MAX)));
        let s = TypedProperty::with_value(PropertyType::String, "12").expect("string");
        assert_eq!(s.as_integer(), Ok(12));
        let d = TypedProperty::with_value(PropertyType::Double, 1.5).expect("double");
        assert!(d.as_integer().is_err());
    }

    #[test]
    fn display_joins_sequences() {
        let p = TypedProperty::with_value(PropertyType::String, vec!["a", "b"]).expect("list");
        assert_eq!(p.to_string(), "a, b");
        assert_eq!(TypedProperty::new(PropertyType::String).to_string(), "");
    }
}
