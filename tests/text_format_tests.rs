use gvariant::{
    from_text, from_text_with_options, from_text_with_type, to_text, to_text_with_options, Error,
    ParseOptions, PrintOptions, Value, VariantType,
};

fn ty(s: &str) -> VariantType {
    VariantType::new(s).unwrap()
}

fn annotated(value: &Value) -> String {
    to_text_with_options(value, PrintOptions::annotated())
}

#[test]
fn test_inferred_types() {
    let cases = [
        ("true", "b"),
        ("5", "i"),
        ("-5", "i"),
        ("0x10", "i"),
        ("1.5", "d"),
        ("1e3", "d"),
        ("inf", "d"),
        ("'s'", "s"),
        ("\"s\"", "s"),
        ("<5>", "v"),
        ("[1, 2]", "ai"),
        ("[1, 2.5]", "ad"),
        ("(1, 'a')", "(is)"),
        ("(1,)", "(i)"),
        ("()", "()"),
        ("{'a': 1}", "a{si}"),
        ("{1, true}", "{ib}"),
        ("just 3", "mi"),
        ("[just 'a', nothing]", "ms"),
        ("[[], [byte 0x01]]", "aay"),
        ("@(ss) ('a', 'b')", "(ss)"),
        ("objectpath '/x'", "o"),
        ("signature 'a{sv}'", "g"),
    ];
    for (text, expected) in cases {
        let value = from_text(text).unwrap_or_else(|e| panic!("{}: {}", text, e));
        assert_eq!(value.type_string(), expected, "{}", text);
    }
}

#[test]
fn test_type_hints() {
    assert_eq!(from_text_with_type("5", &ty("t")).unwrap(), Value::new_uint64(5));
    assert_eq!(from_text_with_type("5", &ty("d")).unwrap(), Value::new_double(5.0));
    assert_eq!(
        from_text_with_type("'x'", &ty("ms")).unwrap().print(true),
        "@ms 'x'"
    );
    assert_eq!(
        from_text_with_type("[]", &ty("a{sv}")).unwrap().type_string(),
        "a{sv}"
    );

    // Patterns narrow inference but must still resolve.
    assert_eq!(
        from_text_with_type("[1]", &VariantType::ARRAY).unwrap().type_string(),
        "ai"
    );
    assert_eq!(
        from_text_with_type("(1, 'a')", &VariantType::TUPLE).unwrap().type_string(),
        "(is)"
    );
    assert!(from_text_with_type("[]", &VariantType::ARRAY).is_err());
}

#[test]
fn test_annotated_round_trip() {
    let texts = [
        "(byte 0x01, int16 -2, uint16 3, 4, uint32 5, int64 -6, uint64 7, handle 8, 9.5)",
        "@a{sv} {}",
        "{'a': <[uint16 1]>, 'b': <@mmi just nothing>}",
        "[<'x'>, <objectpath '/p'>, <signature 'ai'>]",
        "@ms nothing",
        "@mms just nothing",
        "[@ay [], [byte 0x01, 0xff]]",
        "('quote\\'s', \"it's\", 'tab\\tnew\\nline')",
        "({1, 2},)",
    ];
    for text in texts {
        let value = from_text(text).unwrap_or_else(|e| panic!("{}: {}", text, e));
        let printed = annotated(&value);
        let reparsed = from_text(&printed).unwrap_or_else(|e| panic!("{}: {}", printed, e));
        assert_eq!(reparsed, value, "{} -> {}", text, printed);
        assert_eq!(reparsed.type_string(), value.type_string());
    }
}

#[test]
fn test_plain_round_trip_with_type() {
    let value = from_text("(uint64 1, [byte 0x02], @mu nothing)").unwrap();
    let plain = to_text(&value);
    assert_eq!(plain, "(1, [0x02], nothing)");
    let reparsed = from_text_with_type(&plain, value.variant_type()).unwrap();
    assert_eq!(reparsed, value);
}

#[test]
fn test_string_escapes() {
    let value = from_text(r#"'é\x\n\\'"#).unwrap();
    assert_eq!(value.as_str(), Some("\u{e9}x\n\\"));

    let value = from_text(r"'\U0001F600'").unwrap();
    assert_eq!(value.as_str(), Some("\u{1F600}"));

    let value = Value::new_string("\u{1}").unwrap();
    assert_eq!(to_text(&value), "'\\u0001'");
    assert_eq!(from_text(&to_text(&value)).unwrap(), value);
}

#[test]
fn test_doubles() {
    for d in [0.0, -1.25, 1e100, 3.0e-7, f64::INFINITY, f64::NEG_INFINITY] {
        let value = Value::new_double(d);
        let reparsed = from_text(&to_text(&value)).unwrap();
        assert_eq!(reparsed.as_double(), Some(d));
    }
    let nan = from_text(&to_text(&Value::new_double(f64::NAN))).unwrap();
    assert!(nan.as_double().unwrap().is_nan());
}

#[test]
fn test_errors_carry_positions() {
    let cases = [
        ("[1, 'a']", None),
        ("(1, 2", Some(5)),
        ("'unterminated", None),
        ("5 6", Some(2)),
        ("@zz 5", None),
        ("[]", None),
        ("byte 256", None),
        ("int16 40000", None),
        ("", Some(0)),
    ];
    for (text, position) in cases {
        let err = from_text(text).unwrap_err();
        assert!(matches!(err, Error::Parse { .. } | Error::MalformedType { .. }), "{}: {:?}", text, err);
        if let Some(position) = position {
            assert_eq!(err.position(), Some(position), "{}", text);
        }
    }
}

#[test]
fn test_type_mismatch_with_hint() {
    let err = from_text_with_type("'a'", &VariantType::INT32).unwrap_err();
    assert!(err.to_string().contains("'i'"), "{}", err);
    assert!(from_text_with_type("true", &VariantType::STRING).is_err());
    assert!(from_text_with_type("(1, 2)", &ty("(i)")).is_err());
}

#[test]
fn test_depth_limit() {
    let deep = format!("{}1{}", "[".repeat(200), "]".repeat(200));
    assert!(from_text(&deep).is_err());

    let options = ParseOptions::new().with_max_depth(250);
    let shallow = format!("{}1{}", "<".repeat(100), ">".repeat(100));
    assert!(from_text_with_options(&shallow, options).is_ok());
}

#[test]
fn test_display_and_from_str() {
    let value: Value = "[uint32 1, 2]".parse().unwrap();
    assert_eq!(value.to_string(), "[uint32 1, 2]");
    assert_eq!(format!("{}", Value::new_int32(3)), "3");
}
