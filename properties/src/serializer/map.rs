//! Map-form serialization: properties to and from JSON.
//!
//! A plain property is written as its bare serialized value; anything else is
//! an object keyed by field name. `datatype` is never written but is read back
//! from objects that carry it.

use serde_json::{Map, Value};

use crate::error::{PropertyError, Result};
use crate::pattern::{dict_bool, dict_str, PatternFields};
use crate::property::TypedProperty;
use crate::property_type::PropertyType;
use crate::value::{PropertyValue, Scalar};

impl TypedProperty {
    /// Builds the map-form representation.
    ///
    /// ```
    /// use cybox_properties::{PropertyType, TypedProperty};
    /// use serde_json::json;
    ///
    /// let plain = TypedProperty::with_value(PropertyType::String, "hello")?;
    /// assert_eq!(plain.to_dict(), json!("hello"));
    ///
    /// let named = plain.with_id("x");
    /// assert_eq!(named.to_dict(), json!({"value": "hello", "id": "x"}));
    /// # Ok::<(), cybox_properties::PropertyError>(())
    /// ```
    #[must_use]
    pub fn to_dict(&self) -> Value {
        let serialized = self.serialized_value();
        if self.is_plain() {
            return serialized.map_or(Value::Null, |v| v.to_json());
        }

        let mut map = Map::new();
        if let Some(value) = serialized {
            map.insert("value".to_owned(), value.to_json());
        }

        insert_text(&mut map, "id", &self.id);
        insert_text(&mut map, "idref", &self.idref);
        insert_flag(&mut map, "appears_random", self.appears_random);
        insert_flag(&mut map, "is_obfuscated", self.is_obfuscated);
        insert_text(&mut map, "obfuscation_algorithm_ref", &self.obfuscation_algorithm_ref);
        insert_flag(&mut map, "is_defanged", self.is_defanged);
        insert_text(&mut map, "defanging_algorithm_ref", &self.defanging_algorithm_ref);
        insert_text(&mut map, "refanging_transform_type", &self.refanging_transform_type);
        insert_text(&mut map, "refanging_transform", &self.refanging_transform);

        self.pattern.to_dict(&mut map);

        Value::Object(map)
    }

    /// Rebuilds a property of datatype `kind` from its map-form.
    ///
    /// Falsy input (`null`, `false`, `0`, `""`, `[]`, `{}`) yields `Ok(None)`.
    /// Anything that is not an object is taken as the bare value.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::ValueConversion`] if the value cannot be
    /// coerced to `kind`, or if it is neither a scalar nor a list of scalars.
    pub fn from_dict(kind: PropertyType, dict: &Value) -> Result<Option<Self>> {
        if is_falsy(dict) {
            return Ok(None);
        }

        let mut property = Self::new(kind);
        let Value::Object(map) = dict else {
            property.set_value(value_from_json(kind, Some(dict))?)?;
            return Ok(Some(property));
        };

        property.set_value(value_from_json(kind, map.get("value"))?)?;
        property.set_datatype(dict_str(map, "datatype").map(str::to_owned));

        property.id = owned(dict_str(map, "id"));
        property.idref = owned(dict_str(map, "idref"));
        property.appears_random = dict_bool(map, "appears_random");
        property.is_obfuscated = dict_bool(map, "is_obfuscated");
        property.obfuscation_algorithm_ref = owned(dict_str(map, "obfuscation_algorithm_ref"));
        property.is_defanged = dict_bool(map, "is_defanged");
        property.defanging_algorithm_ref = owned(dict_str(map, "defanging_algorithm_ref"));
        property.refanging_transform_type = owned(dict_str(map, "refanging_transform_type"));
        property.refanging_transform = owned(dict_str(map, "refanging_transform"));

        property.pattern = PatternFields::from_dict(map);

        Ok(Some(property))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TypedProperty {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.to_dict(), serializer)
    }
}

fn insert_text(map: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        map.insert(key.to_owned(), Value::String(v.clone()));
    }
}

fn insert_flag(map: &mut Map<String, Value>, key: &str, value: Option<bool>) {
    if let Some(v) = value {
        map.insert(key.to_owned(), Value::Bool(v));
    }
}

fn owned(text: Option<&str>) -> Option<String> {
    text.map(str::to_owned)
}

/// Whether a JSON value counts as "nothing here".
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn value_from_json(kind: PropertyType, value: Option<&Value>) -> Result<Option<PropertyValue>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                Scalar::from_json(item).ok_or_else(|| {
                    PropertyError::conversion(
                        kind.tag(),
                        item.to_string(),
                        "sequence items must be scalars",
                    )
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(|items| Some(PropertyValue::Multiple(items))),
        Some(Value::Object(_)) => Err(PropertyError::conversion(
            kind.tag(),
            "{...}",
            "an object is not a property value",
        )),
        Some(scalar) => Ok(Scalar::from_json(scalar).map(PropertyValue::Single)),
    }
}
