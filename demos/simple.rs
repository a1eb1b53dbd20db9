//! Building, storing and loading values.
//!
//! Run with: cargo run --example simple

use gvariant::{from_bytes, to_bytes, Value, VariantType};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let user = Value::new_tuple(vec![
        Value::new_uint32(42),
        Value::new_string("Alice Johnson")?,
        Value::new_strv(&["admin", "developer"])?,
    ]);
    println!("Type: {}", user.type_string());
    println!("Text: {}", user);

    // Serialise to the binary format
    let bytes = to_bytes(&user);
    println!("Binary ({} bytes): {:02x?}\n", bytes.len(), bytes);

    // Load it back; children are read straight from the buffer
    let ty = VariantType::new("(usas)")?;
    let loaded = from_bytes(&ty, bytes)?;
    assert_eq!(loaded, user);

    let name = loaded.child(1)?;
    println!("Name: {}", name.as_str().unwrap_or_default());
    println!("Roles: {:?}", loaded.child(2)?.strv().unwrap_or_default());
    println!("✓ Round-trip successful");

    Ok(())
}
