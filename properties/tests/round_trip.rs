//! End-to-end behaviour of typed properties across both serialization forms.

use cybox_properties::binding::registry;
use cybox_properties::{
    ApplyCondition, BindingType, Condition, ObjectPropertyElement, ObjectPropertyNode,
    PatternType, PropertyError, PropertyType, PropertyValue, Scalar, TypedProperty,
};
use serde_json::{json, Value};

/// A representative non-empty map-form value for each datatype.
fn sample(kind: PropertyType) -> Value {
    match kind {
        PropertyType::String => json!("hello"),
        PropertyType::Integer => json!(-42),
        PropertyType::UnsignedLong => json!(18_446_744_073_709_551_615_u64),
        PropertyType::PositiveInteger => json!(7),
        PropertyType::UnsignedInteger => json!(3),
        PropertyType::NonNegativeInteger => json!(5),
        PropertyType::AnyUri => json!("http://example.com/index.html"),
        PropertyType::HexBinary => json!("d41d8cd98f00b204e9800998ecf8427e"),
        PropertyType::Duration => json!("P1DT2H"),
        PropertyType::DateTime => json!("2014-01-31T06:14:46+00:00"),
        PropertyType::Double => json!(3.5),
        PropertyType::Float => json!(1.25),
        PropertyType::Long => json!(1_234_567_890_123_i64),
    }
}

fn from_dict(kind: PropertyType, dict: &Value) -> TypedProperty {
    match TypedProperty::from_dict(kind, dict) {
        Ok(Some(p)) => p,
        other => panic!("{kind}: expected a property from {dict}, got {other:?}"),
    }
}

// =============================================================================
// Round trips
// =============================================================================

#[test]
fn every_datatype_round_trips_through_map_form() {
    for kind in PropertyType::ALL {
        let dict = sample(kind);
        let property = from_dict(kind, &dict);
        assert!(property.is_plain(), "{kind}");
        assert_eq!(property.to_dict(), dict, "{kind}");
        assert_eq!(from_dict(kind, &property.to_dict()), property, "{kind}");
    }
}

#[test]
fn every_datatype_round_trips_through_tree_form() {
    for kind in PropertyType::ALL {
        let property = from_dict(kind, &sample(kind)).with_id("example:p-1");
        let element = property.to_obj();
        assert_eq!(element.binding_type(), kind.binding_type(), "{kind}");

        let back = TypedProperty::from_binding(Some(&element))
            .expect("registered binding")
            .expect("present");
        assert_eq!(back.kind(), kind);
        assert_eq!(back.id.as_deref(), Some("example:p-1"));
        // Pass-through numerics come back as text; the emitted text is stable.
        assert_eq!(back.to_obj().value_of(), element.value_of(), "{kind}");
        if !matches!(kind, PropertyType::Double | PropertyType::Float | PropertyType::Long) {
            assert_eq!(back, property, "{kind}");
        }
    }
}

#[test]
fn metadata_survives_both_forms() {
    let mut property = TypedProperty::with_value(PropertyType::AnyUri, "hxxp://evil[.]example")
        .expect("uri")
        .with_id("example:uri-7");
    property.is_defanged = Some(true);
    property.defanging_algorithm_ref = Some("urn:defang:brackets".to_owned());
    property.refanging_transform_type = Some("RegEx".to_owned());
    property.refanging_transform = Some("s/\\[\\.\\]/./g".to_owned());
    property.appears_random = Some(false);
    property.pattern.condition = Some(Condition::FitsPattern);
    property.pattern.apply_condition = Some(ApplyCondition::Any);
    property.pattern.pattern_type = Some(PatternType::Regex);
    property.pattern.regex_syntax = Some("PCRE".to_owned());

    let via_dict = from_dict(PropertyType::AnyUri, &property.to_dict());
    assert_eq!(via_dict, property);

    let via_tree = TypedProperty::from_obj(PropertyType::AnyUri, Some(&property.to_obj()))
        .expect("uri")
        .expect("present");
    assert_eq!(via_tree, property);
}

#[test]
fn commas_survive_tree_form() {
    let property = TypedProperty::with_value(PropertyType::String, vec!["a,b", "c"])
        .expect("strings");
    let element = property.to_obj();
    assert_eq!(element.value_of(), Some("a&comma;b,c"));

    let back = TypedProperty::from_obj(PropertyType::String, Some(&element))
        .expect("strings")
        .expect("present");
    assert_eq!(back, property);
}

// =============================================================================
// Equality, plainness and content
// =============================================================================

#[test]
fn datatype_tag_is_ignored_by_equality() {
    let tagged = from_dict(
        PropertyType::String,
        &json!({"value": "x", "datatype": "string", "id": "a"}),
    );
    let untagged = from_dict(PropertyType::String, &json!({"value": "x", "id": "a"}));
    assert_eq!(tagged.datatype(), Some("string"));
    assert_eq!(untagged.datatype(), None);
    assert_eq!(tagged, untagged);
}

#[test]
fn different_datatypes_are_never_equal() {
    let a = TypedProperty::with_value(PropertyType::HexBinary, "ab").expect("hex");
    let b = TypedProperty::with_value(PropertyType::String, "ab").expect("string");
    assert_ne!(a, b);
}

#[test]
fn bare_value_comparison_needs_a_plain_property() {
    let plain = TypedProperty::with_value(PropertyType::Integer, 42_i64).expect("integer");
    assert!(plain.equals_value(42_i64));
    assert!(!plain.equals_value("42"));
    assert!(!plain.clone().with_id("n").equals_value(42_i64));
}

#[test]
fn empty_plain_property_has_no_content() {
    let empty = TypedProperty::new(PropertyType::String);
    assert!(empty.is_plain());
    assert!(!empty.has_content());
    assert_eq!(empty.to_dict(), Value::Null);
    assert!(empty.with_idref("example:1").has_content());
}

#[test]
fn apply_condition_alone_does_not_break_plainness() {
    let mut property = TypedProperty::with_value(PropertyType::String, "x").expect("string");
    property.pattern.apply_condition = Some(ApplyCondition::All);
    assert!(property.is_plain());
    assert_eq!(property.to_dict(), json!("x"));
}

// =============================================================================
// Coercion
// =============================================================================

#[test]
fn integer_family_rejects_non_numeric_text() {
    for kind in PropertyType::ALL.into_iter().filter(|k| k.is_integer_family()) {
        let err = TypedProperty::with_value(kind, "abc").expect_err("not an integer");
        assert!(matches!(err, PropertyError::ValueConversion { .. }), "{kind}");
    }
}

#[test]
fn failed_assignment_keeps_previous_value() {
    let mut property = TypedProperty::with_value(PropertyType::Integer, 1_i64).expect("integer");
    assert!(property
        .set_value(Some(PropertyValue::from("one")))
        .is_err());
    assert_eq!(property.value(), Some(&PropertyValue::from(1_i64)));
}

#[test]
fn datetime_accepts_common_formats() {
    for text in [
        "2014-01-31T06:14:46Z",
        "2014-01-31T06:14:46+00:00",
        "2014-01-31T06:14:46.000+00:00",
        "Fri, 31 Jan 2014 06:14:46 +0000",
    ] {
        let property = TypedProperty::with_value(PropertyType::DateTime, text).expect(text);
        assert_eq!(property.to_dict(), json!("2014-01-31T06:14:46+00:00"), "{text}");
    }
    assert!(TypedProperty::with_value(PropertyType::DateTime, "yesterday").is_err());
}

#[test]
fn datetime_accepts_basic_and_textual_forms() {
    for (text, expected) in [
        ("20140131T061446Z", "2014-01-31T06:14:46+00:00"),
        ("2014-01-31T06:14Z", "2014-01-31T06:14:00+00:00"),
        ("2014-01-31T06:14:46 UTC", "2014-01-31T06:14:46+00:00"),
        ("Jan 31 2014 06:14:46", "2014-01-31T06:14:46"),
    ] {
        let property = TypedProperty::with_value(PropertyType::DateTime, text).expect(text);
        assert_eq!(property.to_dict(), json!(expected), "{text}");
    }
}

#[test]
fn datetime_sequence_with_empty_item_is_rejected() {
    let err = TypedProperty::with_value(PropertyType::DateTime, vec!["2014-01-31T06:14:46Z", ""])
        .expect_err("empty item");
    assert!(matches!(err, PropertyError::ValueConversion { .. }));
}

#[test]
fn empty_datetime_text_clears_the_value() {
    let property = TypedProperty::with_value(PropertyType::DateTime, "").expect("empty");
    assert_eq!(property.value(), None);
}

#[test]
fn as_integer_reads_numeric_text() {
    let long = TypedProperty::with_value(PropertyType::Long, "12").expect("long");
    assert_eq!(long.as_integer(), Ok(12));
    let text = TypedProperty::with_value(PropertyType::String, "twelve").expect("string");
    assert!(text.as_integer().is_err());
}

// =============================================================================
// Registry and dispatch
// =============================================================================

#[test]
fn registry_covers_every_datatype_and_the_hash_alias() {
    let table = registry();
    assert_eq!(table.len(), BindingType::ALL.len());
    for kind in PropertyType::ALL {
        assert_eq!(table.get(&kind.binding_type()), Some(&kind), "{kind}");
    }
    assert_eq!(
        table.get(&BindingType::SimpleHashValueType),
        Some(&PropertyType::HexBinary)
    );
}

#[test]
fn datatype_names_parse_from_tags_and_type_names() {
    assert_eq!("unsignedInt".parse::<PropertyType>(), Ok(PropertyType::UnsignedInteger));
    assert_eq!("anyURI".parse::<PropertyType>(), Ok(PropertyType::AnyUri));
    assert_eq!("SimpleHashValueType".parse::<PropertyType>(), Ok(PropertyType::HexBinary));
    assert_eq!(
        "decimal".parse::<PropertyType>(),
        Err(PropertyError::UnknownDatatype("decimal".to_owned()))
    );
}

#[test]
fn hash_elements_decode_as_hex() {
    let element = ObjectPropertyElement::with_text(BindingType::SimpleHashValueType, "00ff");
    let property = TypedProperty::from_binding(Some(&element))
        .expect("hex")
        .expect("present");
    assert_eq!(property.kind(), PropertyType::HexBinary);
    assert_eq!(property.value(), Some(&PropertyValue::Single(Scalar::Text("00ff".into()))));
}

#[test]
fn absent_inputs_are_not_errors() {
    assert_eq!(
        TypedProperty::from_binding::<ObjectPropertyElement>(None),
        Ok(None)
    );
    assert_eq!(TypedProperty::from_dict(PropertyType::Long, &Value::Null), Ok(None));
}
