//! Exact byte layouts of the binary format.

use gvariant::serialised::{offset_size, total_size};
use gvariant::{from_bytes, from_text, to_bytes, Value, VariantType};

fn ty(s: &str) -> VariantType {
    VariantType::new(s).unwrap()
}

fn bytes_of(text: &str) -> Vec<u8> {
    to_bytes(&from_text(text).unwrap())
}

#[test]
fn test_basic_layouts() {
    assert_eq!(to_bytes(&Value::new_boolean(true)), [1]);
    assert_eq!(to_bytes(&Value::new_int16(-2)), [0xfe, 0xff]);
    assert_eq!(to_bytes(&Value::new_uint32(0x0a0b_0c0d)), [0x0d, 0x0c, 0x0b, 0x0a]);
    assert_eq!(to_bytes(&Value::new_double(1.0)), 1.0f64.to_le_bytes());
    assert_eq!(to_bytes(&Value::new_string("").unwrap()), [0]);
    assert_eq!(to_bytes(&Value::new_object_path("/a").unwrap()), b"/a\0");
}

#[test]
fn test_array_layouts() {
    assert_eq!(bytes_of("['a', 'b']"), [b'a', 0, b'b', 0, 2, 4]);
    assert_eq!(bytes_of("[true, false]"), [1, 0]);
    assert_eq!(bytes_of("[uint16 1, 2]"), [1, 0, 2, 0]);
    assert_eq!(bytes_of("@as []"), [0u8; 0]);
}

#[test]
fn test_maybe_layouts() {
    assert_eq!(bytes_of("@ms 'a'"), [b'a', 0, 0]);
    assert_eq!(bytes_of("@ms ''"), [0, 0]);
    assert_eq!(bytes_of("@ms nothing"), [0u8; 0]);
    assert_eq!(bytes_of("@mi 5"), [5, 0, 0, 0]);
    assert_eq!(bytes_of("@mi nothing"), [0u8; 0]);
}

#[test]
fn test_tuple_layouts() {
    assert_eq!(bytes_of("()"), [0]);
    assert_eq!(bytes_of("(byte 0x01, uint32 2)"), [1, 0, 0, 0, 2, 0, 0, 0]);
    // Fixed tuples are padded to their alignment.
    assert_eq!(bytes_of("(uint32 1, byte 0x02)"), [1, 0, 0, 0, 2, 0, 0, 0]);
    // The last member never gets a framing offset.
    assert_eq!(bytes_of("(byte 0x07, 'ab')"), [7, b'a', b'b', 0]);
    assert_eq!(bytes_of("('ab', byte 0x07)"), [b'a', b'b', 0, 7, 3]);
    // Offsets are stored in reverse member order.
    assert_eq!(
        bytes_of("('a', 'bc', 'd')"),
        [b'a', 0, b'b', b'c', 0, b'd', 0, 5, 2]
    );
}

#[test]
fn test_variant_layout() {
    let value = Value::new_variant(Value::new_int32(5));
    assert_eq!(to_bytes(&value), [5, 0, 0, 0, 0, b'i']);

    let nested = Value::new_variant(Value::new_strv(&["x"]).unwrap());
    assert_eq!(to_bytes(&nested), [b'x', 0, 2, 0, b'a', b's']);
}

#[test]
fn test_dictionary_layout() {
    // Entry: 'a' NUL, padding to 8, variant <true>, offset of the key end.
    let expected = [b'a', 0, 0, 0, 0, 0, 0, 0, 1, 0, b'b', 2, 12];
    assert_eq!(bytes_of("{'a': <true>}"), expected);

    let loaded = from_bytes(&VariantType::VARDICT, expected.to_vec()).unwrap();
    assert!(loaded.is_normal_form());
    assert_eq!(
        loaded.lookup_value("a", None).and_then(|v| v.as_bool()),
        Some(true)
    );
}

#[test]
fn test_offset_size_thresholds() {
    assert_eq!(offset_size(0), 0);
    assert_eq!(offset_size(1), 1);
    assert_eq!(offset_size(255), 1);
    assert_eq!(offset_size(256), 2);
    assert_eq!(offset_size(65535), 2);
    assert_eq!(offset_size(65536), 4);

    assert_eq!(total_size(0, 0), 0);
    assert_eq!(total_size(253, 2), 255);
    assert_eq!(total_size(254, 2), 258);
    assert_eq!(total_size(65533, 1), 65535);
    assert_eq!(total_size(65534, 1), 65538);
}

#[test]
fn test_offset_width_at_255_and_257() {
    let fits = "a".repeat(253);
    let value = Value::new_strv(&[fits.as_str()]).unwrap();
    let data = to_bytes(&value);
    assert_eq!(data.len(), 255);
    assert_eq!(data[254], 254);

    let spills = "a".repeat(254);
    let value = Value::new_strv(&[spills.as_str()]).unwrap();
    let data = to_bytes(&value);
    assert_eq!(data.len(), 257);
    assert_eq!(&data[255..], &[255, 0]);

    let loaded = from_bytes(&VariantType::STRING_ARRAY, data).unwrap();
    assert!(loaded.is_normal_form());
    assert_eq!(loaded.strv(), Some(vec![spills]));
}

#[test]
fn test_offset_width_at_65535() {
    let fits = "b".repeat(65532);
    let data = to_bytes(&Value::new_strv(&[fits.as_str()]).unwrap());
    assert_eq!(data.len(), 65535);
    assert_eq!(&data[65533..], &65533u16.to_le_bytes());

    let spills = "b".repeat(65533);
    let data = to_bytes(&Value::new_strv(&[spills.as_str()]).unwrap());
    assert_eq!(data.len(), 65538);
    assert_eq!(&data[65534..], &65534u32.to_le_bytes());
}

#[test]
fn test_wrong_fixed_size_loads_as_zero() {
    let value = from_bytes(&ty("(uy)"), vec![1u8, 2, 3]).unwrap();
    assert_eq!(value.size(), 8);
    assert_eq!(value.child(0).unwrap().as_uint32(), Some(0));
    assert_eq!(value.child(1).unwrap().as_byte(), Some(0));
}

#[test]
fn test_malformed_framing_reads_defaults() {
    // Framing offset points past the end of the container.
    let value = from_bytes(&ty("(sy)"), vec![b'a', 0, 9, 40]).unwrap();
    assert!(!value.is_normal_form());
    assert_eq!(value.child(0).unwrap().as_str(), Some(""));
    assert_eq!(value.child(1).unwrap().as_byte(), Some(0));

    // A variant naming an unknown type reads as the unit tuple.
    let value = from_bytes(&VariantType::VARIANT, vec![1, 0, b'z']).unwrap();
    let inner = value.as_variant().unwrap();
    assert_eq!(inner.type_string(), "()");
    assert_eq!(inner.size(), 1);

    // Invalid object path content reads as the root path.
    let value = from_bytes(&VariantType::OBJECT_PATH, b"a//\0".to_vec()).unwrap();
    assert_eq!(value.as_str(), Some("/"));
}

#[test]
fn test_serialised_matches_tree_form() {
    let tree = from_text("[('a', <uint64 1>), ('bc', <[byte 0x01, 0x02]>)]").unwrap();
    let loaded = from_bytes(tree.variant_type(), to_bytes(&tree)).unwrap();
    assert!(loaded.is_normal_form());
    assert_eq!(loaded, tree);
    assert_eq!(loaded.print(true), tree.print(true));
}
