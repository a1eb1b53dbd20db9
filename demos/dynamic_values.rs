//! Walking values whose type is only known at runtime.
//!
//! Run with: cargo run --example dynamic_values

use gvariant::{variant, Class, Value, VariantBuilder, VariantDict, VariantType};
use std::error::Error;

fn describe(value: &Value, indent: usize) {
    let pad = " ".repeat(indent);
    match value.classify() {
        Class::Variant => {
            if let Some(inner) = value.as_variant() {
                println!("{}variant of {}", pad, inner.type_string());
                describe(&inner, indent + 2);
            }
        }
        class if class.is_container() => {
            println!("{}{:?} '{}' with {} children", pad, class, value.type_string(), value.n_children());
            for child in value {
                describe(&child, indent + 2);
            }
        }
        _ => println!("{}{}", pad, value.print(true)),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Build a settings dictionary
    let mut settings = VariantDict::new();
    settings.insert("host", Value::new_string("localhost")?);
    settings.insert("port", Value::new_uint16(8080));
    settings.insert("features", variant!(["auth", "logging", "metrics"])?);
    settings.insert("debug", Value::new_boolean(true));
    let config = settings.end()?;

    println!("Config: {}\n", config);
    describe(&config, 0);

    // Typed lookups
    let port = config.lookup_value("port", Some(&VariantType::UINT16));
    println!("\nport = {:?}", port.and_then(|p| p.as_uint16()));

    // Incremental construction
    let mut builder = VariantBuilder::new(&VariantType::ARRAY)?;
    for i in 0..3 {
        builder.open(&VariantType::TUPLE)?;
        builder.add_value(Value::new_int32(i))?;
        builder.add_value(Value::new_string(&format!("item{}", i))?)?;
        builder.close()?;
    }
    let items = builder.end()?;
    println!("Built {}: {}", items.type_string(), items);

    // Any value can be emitted through serde
    println!("As JSON: {}", serde_json::to_string(&config)?);

    Ok(())
}
