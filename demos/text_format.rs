//! Printing and parsing the text format.
//!
//! Run with: cargo run --example text_format

use gvariant::{from_text, from_text_with_type, to_text, to_text_with_options, PrintOptions, VariantType};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Types are inferred from the literals
    let value = from_text("{'width': <640>, 'title': <'main'>, 'ratio': <1.5>}")?;
    println!("{} : {}", to_text(&value), value.type_string());

    // Annotations keep types that inference would lose
    let value = from_text("(uint16 7, @as [], @mi nothing, byte 0x2a)")?;
    let plain = to_text(&value);
    let annotated = to_text_with_options(&value, PrintOptions::annotated());
    println!("plain:     {}", plain);
    println!("annotated: {}", annotated);
    assert_eq!(from_text(&annotated)?, value);

    // Plain text still parses when the type is supplied
    let typed = from_text_with_type(&plain, &VariantType::new("(qasmiy)")?)?;
    assert_eq!(typed, value);

    // Errors point at the offending byte
    match from_text("[1, 'two']") {
        Ok(_) => unreachable!(),
        Err(err) => println!("error: {}", err),
    }

    Ok(())
}
