//! Loading data from an untrusted source.
//!
//! Run with: cargo run --example untrusted_data

use gvariant::{from_bytes, to_bytes, Value, VariantType};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let ty = VariantType::new("(sas)")?;

    // Well-formed input is already in normal form
    let good = to_bytes(&Value::new_tuple(vec![
        Value::new_string("name")?,
        Value::new_strv(&["a", "b"])?,
    ]));
    let value = from_bytes(&ty, good)?;
    println!("{} normal: {}", value, value.is_normal_form());

    // Corrupt the framing offset: reads fall back instead of failing
    let mut bad = to_bytes(&value);
    let last = bad.len() - 1;
    bad[last] = 0xff;
    let value = from_bytes(&ty, bad)?;
    println!("{} normal: {}", value, value.is_normal_form());

    // Normal form rebuilds a clean copy from what the readers saw
    let fixed = value.normal_form();
    println!("{} normal: {}", fixed, fixed.is_normal_form());

    // Data from a machine with the other byte order
    let swapped = Value::new_uint32(1).byteswap();
    println!("byteswapped 1 = {:#010x}", swapped.as_uint32().unwrap_or_default());

    Ok(())
}
