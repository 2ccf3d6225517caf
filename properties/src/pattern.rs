//! Pattern-matching attributes shared by every object property.
//!
//! These attributes turn a property into a match expression ("value
//! `StartsWith` x", "value `FitsPattern` regex"). They ride along with every
//! datatype and take part in plainness, equality and both serialization forms.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use tracing::warn;

use crate::binding::PatternFieldNode;
use crate::error::PropertyError;

macro_rules! schema_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[cfg_attr(feature = "serde", serde(rename = $text))]
                $variant,
            )*
        }

        impl $name {
            /// Returns the schema text of this value.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = PropertyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)*
                    other => Err(PropertyError::UnknownEnumeration {
                        kind: stringify!($name),
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

schema_enum! {
    /// Comparison applied between the property value and the observed data.
    pub enum Condition {
        /// Exact match.
        Equals => "Equals",
        /// Negated exact match.
        DoesNotEqual => "DoesNotEqual",
        /// Substring match.
        Contains => "Contains",
        /// Negated substring match.
        DoesNotContain => "DoesNotContain",
        /// Prefix match.
        StartsWith => "StartsWith",
        /// Suffix match.
        EndsWith => "EndsWith",
        /// Greater than.
        GreaterThan => "GreaterThan",
        /// Greater than or equal.
        GreaterThanOrEqual => "GreaterThanOrEqual",
        /// Less than.
        LessThan => "LessThan",
        /// Less than or equal.
        LessThanOrEqual => "LessThanOrEqual",
        /// Within a closed range.
        InclusiveBetween => "InclusiveBetween",
        /// Within an open range.
        ExclusiveBetween => "ExclusiveBetween",
        /// Matches the pattern given by `pattern_type`.
        FitsPattern => "FitsPattern",
        /// Member of the value list.
        IsInSet => "IsInSet",
        /// Non-zero after AND with `bit_mask`.
        BitwiseAnd => "BitwiseAnd",
        /// Non-zero after OR with `bit_mask`.
        BitwiseOr => "BitwiseOr",
    }
}

schema_enum! {
    /// How a condition applies to a list-valued property.
    pub enum ApplyCondition {
        /// At least one element matches.
        Any => "ANY",
        /// Every element matches.
        All => "ALL",
        /// No element matches.
        None => "NONE",
    }
}

schema_enum! {
    /// Pattern language used with [`Condition::FitsPattern`].
    pub enum PatternType {
        /// Regular expression.
        Regex => "Regex",
        /// Binary pattern.
        Binary => "Binary",
        /// XPath expression.
        XPath => "XPath",
    }
}

/// The pattern-matching attribute group.
///
/// `==` is [`PatternFields::fields_equal`].
#[derive(Debug, Clone, Default)]
pub struct PatternFields {
    /// Comparison to apply.
    pub condition: Option<Condition>,
    /// How `condition` applies to list values. Only emitted with `condition`.
    pub apply_condition: Option<ApplyCondition>,
    /// Hex mask for the bitwise conditions.
    pub bit_mask: Option<String>,
    /// Pattern language for `FitsPattern`.
    pub pattern_type: Option<PatternType>,
    /// Regex dialect when `pattern_type` is `Regex`.
    pub regex_syntax: Option<String>,
    /// Whether the value changed between observations.
    pub has_changed: Option<bool>,
    /// Whether the value follows a trend.
    pub trend: Option<bool>,
}

impl PatternFields {
    /// Whether no pattern attribute is set. `apply_condition` is ignored.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.condition.is_none()
            && self.bit_mask.is_none()
            && self.pattern_type.is_none()
            && self.regex_syntax.is_none()
            && self.has_changed.is_none()
            && self.trend.is_none()
    }

    /// Compares two groups.
    ///
    /// Conditions are equal when both are unset; otherwise `condition` and
    /// `apply_condition` must both match.
    #[must_use]
    pub fn fields_equal(&self, other: &Self) -> bool {
        let conditions_equal = (self.condition.is_none() && other.condition.is_none())
            || (self.condition == other.condition
                && self.apply_condition == other.apply_condition);
        conditions_equal
            && self.bit_mask == other.bit_mask
            && self.pattern_type == other.pattern_type
            && self.regex_syntax == other.regex_syntax
            && self.has_changed == other.has_changed
            && self.trend == other.trend
    }

    /// Writes the set attributes onto a node.
    pub fn to_obj<N: PatternFieldNode + ?Sized>(&self, node: &mut N) {
        if let Some(condition) = self.condition {
            node.set_condition(condition.as_str().to_owned());
            if let Some(apply) = self.apply_condition {
                node.set_apply_condition(apply.as_str().to_owned());
            }
        }
        if let Some(mask) = &self.bit_mask {
            node.set_bit_mask(mask.clone());
        }
        if let Some(pattern_type) = self.pattern_type {
            node.set_pattern_type(pattern_type.as_str().to_owned());
        }
        if let Some(syntax) = &self.regex_syntax {
            node.set_regex_syntax(syntax.clone());
        }
        if let Some(changed) = self.has_changed {
            node.set_has_changed(changed);
        }
        if let Some(trend) = self.trend {
            node.set_trend(trend);
        }
    }

    /// Adds the set attributes to a map-form object.
    pub fn to_dict(&self, map: &mut Map<String, Value>) {
        if let Some(condition) = self.condition {
            map.insert("condition".to_owned(), Value::from(condition.as_str()));
            if let Some(apply) = self.apply_condition {
                map.insert("apply_condition".to_owned(), Value::from(apply.as_str()));
            }
        }
        if let Some(mask) = &self.bit_mask {
            map.insert("bit_mask".to_owned(), Value::from(mask.as_str()));
        }
        if let Some(pattern_type) = self.pattern_type {
            map.insert("pattern_type".to_owned(), Value::from(pattern_type.as_str()));
        }
        if let Some(syntax) = &self.regex_syntax {
            map.insert("regex_syntax".to_owned(), Value::from(syntax.as_str()));
        }
        if let Some(changed) = self.has_changed {
            map.insert("has_changed".to_owned(), Value::Bool(changed));
        }
        if let Some(trend) = self.trend {
            map.insert("trend".to_owned(), Value::Bool(trend));
        }
    }

    /// Reads the group back from a node. Unknown enumeration text is dropped.
    #[must_use]
    pub fn from_obj<N: PatternFieldNode + ?Sized>(node: &N) -> Self {
        Self {
            condition: parse_enum("condition", node.condition()),
            apply_condition: parse_enum("apply_condition", node.apply_condition()),
            bit_mask: node.bit_mask().map(str::to_owned),
            pattern_type: parse_enum("pattern_type", node.pattern_type()),
            regex_syntax: node.regex_syntax().map(str::to_owned),
            has_changed: node.has_changed(),
            trend: node.trend(),
        }
    }

    /// Reads the group back from a map-form object.
    ///
    /// Missing keys and values of the wrong JSON type read as `None`.
    #[must_use]
    pub fn from_dict(map: &Map<String, Value>) -> Self {
        Self {
            condition: parse_enum("condition", dict_str(map, "condition")),
            apply_condition: parse_enum("apply_condition", dict_str(map, "apply_condition")),
            bit_mask: dict_str(map, "bit_mask").map(str::to_owned),
            pattern_type: parse_enum("pattern_type", dict_str(map, "pattern_type")),
            regex_syntax: dict_str(map, "regex_syntax").map(str::to_owned),
            has_changed: dict_bool(map, "has_changed"),
            trend: dict_bool(map, "trend"),
        }
    }
}

impl PartialEq for PatternFields {
    fn eq(&self, other: &Self) -> bool {
        self.fields_equal(other)
    }
}

impl Eq for PatternFields {}

fn parse_enum<T: FromStr>(field: &'static str, text: Option<&str>) -> Option<T> {
    let text = text?;
    match text.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(field, value = text, "dropping unrecognised pattern attribute");
            None
        }
    }
}

/// Reads a text field, dropping values of any other JSON type.
pub(crate) fn dict_str<'a>(map: &'a Map<String, Value>, key: &'static str) -> Option<&'a str> {
    match map.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => {
            warn!(field = key, value = %other, "dropping non-text field");
            None
        }
    }
}

/// Reads a boolean field, dropping values of any other JSON type.
pub(crate) fn dict_bool(map: &Map<String, Value>, key: &'static str) -> Option<bool> {
    match map.get(key)? {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        other => {
            warn!(field = key, value = %other, "dropping non-boolean field");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BindingType, ObjectPropertyElement};
    use serde_json::json;

    #[test]
    fn default_is_plain() {
        assert!(PatternFields::default().is_plain());
    }

    #[test]
    fn apply_condition_alone_stays_plain() {
        let fields = PatternFields {
            apply_condition: Some(ApplyCondition::All),
            ..PatternFields::default()
        };
        assert!(fields.is_plain());
    }

    #[test]
    fn any_other_field_breaks_plainness() {
        let fields = PatternFields {
            trend: Some(false),
            ..PatternFields::default()
        };
        assert!(!fields.is_plain());
    }

    #[test]
    fn apply_condition_ignored_without_condition() {
        let a = PatternFields {
            apply_condition: Some(ApplyCondition::Any),
            ..PatternFields::default()
        };
        let b = PatternFields {
            apply_condition: Some(ApplyCondition::None),
            ..PatternFields::default()
        };
        assert!(a.fields_equal(&b));
        assert_eq!(a, b);

        let c = PatternFields {
            condition: Some(Condition::Equals),
            apply_condition: Some(ApplyCondition::Any),
            ..PatternFields::default()
        };
        let d = PatternFields {
            condition: Some(Condition::Equals),
            apply_condition: Some(ApplyCondition::All),
            ..PatternFields::default()
        };
        assert!(!c.fields_equal(&d));
        assert_ne!(c, d);
    }

    #[test]
    fn apply_condition_only_emitted_with_condition() {
        let mut map = Map::new();
        PatternFields {
            apply_condition: Some(ApplyCondition::All),
            ..PatternFields::default()
        }
        .to_dict(&mut map);
        assert!(map.is_empty());

        let mut map = Map::new();
        PatternFields {
            condition: Some(Condition::IsInSet),
            apply_condition: Some(ApplyCondition::All),
            ..PatternFields::default()
        }
        .to_dict(&mut map);
        assert_eq!(
            Value::Object(map),
            json!({"condition": "IsInSet", "apply_condition": "ALL"})
        );
    }

    #[test]
    fn node_round_trip() {
        let fields = PatternFields {
            condition: Some(Condition::FitsPattern),
            apply_condition: Some(ApplyCondition::Any),
            bit_mask: None,
            pattern_type: Some(PatternType::Regex),
            regex_syntax: Some("PCRE".to_owned()),
            has_changed: Some(true),
            trend: None,
        };
        let mut element = ObjectPropertyElement::new(BindingType::StringObjectPropertyType);
        fields.to_obj(&mut element);
        assert_eq!(element.condition(), Some("FitsPattern"));
        assert_eq!(PatternFields::from_obj(&element), fields);
    }

    #[test]
    fn unknown_enum_text_is_dropped() {
        let map = json!({"condition": "Resembles", "pattern_type": "Glob", "trend": true});
        let Value::Object(map) = map else {
            unreachable!("literal object")
        };
        let fields = PatternFields::from_dict(&map);
        assert_eq!(fields.condition, None);
        assert_eq!(fields.pattern_type, None);
        assert_eq!(fields.trend, Some(true));
    }

    #[test]
    fn mistyped_fields_are_dropped() {
        let map = json!({"has_changed": "yes", "bit_mask": 255});
        let Value::Object(map) = map else {
            unreachable!("literal object")
        };
        let fields = PatternFields::from_dict(&map);
        assert!(fields.is_plain());
    }
}
