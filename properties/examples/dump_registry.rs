//! Lists every datatype with its element type, and shows one property in
//! both serialization forms.
//!
//! Run with: `cargo run --example dump_registry -p cybox-properties`

use cybox_properties::binding::registry;
use cybox_properties::{Condition, ObjectPropertyNode, PropertyType, TypedProperty};

fn main() -> Result<(), cybox_properties::PropertyError> {
    println!("Registered element types: {}", registry().len());
    for kind in PropertyType::ALL {
        println!(
            "  {:20} {:40} integer-coerced: {}",
            kind.tag(),
            kind.binding_type().type_name(),
            kind.is_integer_family(),
        );
    }
    println!();

    let mut address =
        TypedProperty::with_value(PropertyType::AnyUri, "hxxp://evil[.]example/a,b")?
            .with_id("example:uri-1");
    address.is_defanged = Some(true);
    address.pattern.condition = Some(Condition::Equals);

    let dict = address.to_dict();
    let json_str =
        serde_json::to_string_pretty(&dict).unwrap_or_else(|e| format!("JSON error: {e}"));
    println!("Map-form:\n{json_str}");

    let element = address.to_obj();
    println!("Tree-form <{}>:", element.binding_type());
    println!("  text: {}", element.value_of().unwrap_or(""));
    for (name, value) in element.attributes() {
        println!("  @{name} = {value}");
    }
    Ok(())
}
