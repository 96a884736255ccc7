//! Byte-level behavior of the BSV wire format, exercised through schemas that are
//! described as data.

use bsv_codec::{
    from_slice, to_vec, Context, DynamicRecord, Encoding, Error, FieldType, FieldValue,
    SchemaDefinition, StringMap,
};

fn context_with(fields: &[(&str, FieldType)]) -> Context<DynamicRecord> {
    let schema = fields
        .iter()
        .fold(DynamicRecord::schema_builder("03", '0', '0'), |b, (name, t)| {
            b.dynamic_field(name, *t)
        })
        .build()
        .unwrap();
    Context::builder().with_schema(schema).build().unwrap()
}

fn decode_one(context: &Context<DynamicRecord>, line: &[u8]) -> DynamicRecord {
    let mut input = b"030\n".to_vec();
    input.extend_from_slice(line);
    let mut records = from_slice(context, &input).unwrap();
    assert_eq!(records.len(), 1);
    records.remove(0)
}

#[test]
fn test_boolean_is_true_only_for_one() {
    let context = context_with(&[("b", FieldType::Boolean)]);
    for (token, expected) in [
        ("1", true),
        ("0", false),
        ("", false),
        ("true", false),
        ("2", false),
        ("11", false),
    ] {
        let line = format!("0{}\n", token);
        let record = decode_one(&context, line.as_bytes());
        assert_eq!(record.get("b"), Some(&FieldValue::Bool(expected)), "{:?}", token);
    }
}

#[test]
fn test_absent_numeric_is_null_not_zero() {
    let context = context_with(&[
        ("i", FieldType::Integer),
        ("l", FieldType::Long),
        ("f", FieldType::Float),
        ("d", FieldType::Double),
    ]);
    let record = decode_one(&context, b"0\x01\x01\x01\n");
    for name in ["i", "l", "f", "d"] {
        assert_eq!(record.get(name), Some(&FieldValue::Null), "{}", name);
    }

    let record = decode_one(&context, b"00\x010\x010\x010\n");
    assert_eq!(record.get("i"), Some(&FieldValue::Integer(0)));
    assert_eq!(record.get("l"), Some(&FieldValue::Long(0)));
    assert_eq!(record.get("f"), Some(&FieldValue::Float(0.0)));
    assert_eq!(record.get("d"), Some(&FieldValue::Double(0.0)));
}

#[test]
fn test_numeric_out_of_range_is_value_format_error() {
    let context = context_with(&[("i", FieldType::Integer)]);
    let err = from_slice(&context, b"030\n02147483648\n").unwrap_err();
    assert!(matches!(
        err,
        Error::ValueFormat { ref field, ref field_type, ref token, .. }
            if field == "i" && field_type == "INTEGER" && token == "2147483648"
    ));
}

#[test]
fn test_list_edge_cases() {
    let context = context_with(&[("arr", FieldType::List), ("s", FieldType::String)]);
    let cases: [(&[u8], &[&str]); 5] = [
        (b"0only\x01x\n", &["only"]),
        (b"0a\x02\x01x\n", &["a", ""]),
        (b"0\x02\x01x\n", &["", ""]),
        (b"0\x01x\n", &[""]),
        (b"01.2\x022.4\x02z\x01x\n", &["1.2", "2.4", "z"]),
    ];
    for (line, expected) in cases {
        let record = decode_one(&context, line);
        let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        assert_eq!(record.get("arr"), Some(&FieldValue::List(expected)));
        assert_eq!(record.get("s"), Some(&FieldValue::from("x")));
    }
}

#[test]
fn test_map_wire_form() {
    let context = context_with(&[("m", FieldType::Map), ("s", FieldType::String)]);

    let record = decode_one(&context, b"0\x01x\n");
    assert_eq!(record.get("m"), Some(&FieldValue::Map(StringMap::new())));

    let record = decode_one(&context, b"0a\x034\x02b\x03d\x01x\n");
    let map = record.get("m").and_then(FieldValue::as_map).unwrap();
    assert_eq!(map.get("a").map(String::as_str), Some("4"));
    assert_eq!(map.get("b").map(String::as_str), Some("d"));

    let record = decode_one(&context, b"0k\x03\x01x\n");
    let map = record.get("m").and_then(FieldValue::as_map).unwrap();
    assert_eq!(map.get("k").map(String::as_str), Some(""));
}

#[test]
fn test_last_field_may_end_at_end_of_stream() {
    let context = context_with(&[("s", FieldType::String), ("i", FieldType::Integer)]);
    let record = decode_one(&context, b"0abc\x017");
    assert_eq!(record.get("i"), Some(&FieldValue::Integer(7)));
}

#[test]
fn test_short_line_does_not_swallow_next_line() {
    let context = context_with(&[("s", FieldType::String), ("i", FieldType::Integer)]);
    let input = b"030\n0only\n0next\x015\n";
    let results: Vec<_> = context.decoder(&input[..]).unwrap().collect();

    assert_eq!(results.len(), 2);
    assert!(matches!(results[0], Err(Error::DelimiterMismatch { .. })));
    let record = results[1].as_ref().unwrap();
    assert_eq!(record.get("s"), Some(&FieldValue::from("next")));
}

#[test]
fn test_header_errors() {
    let context = context_with(&[("s", FieldType::String)]);
    assert!(matches!(
        context.decoder(&b""[..]),
        Err(Error::Header(_))
    ));
    assert!(matches!(
        context.decoder(&b"030x0a\n"[..]),
        Err(Error::Header(_))
    ));
}

#[test]
fn test_multibyte_text() {
    let context = context_with(&[("s", FieldType::String), ("arr", FieldType::List)]);
    let record = DynamicRecord::with_version("03.0.0")
        .with("s", "A币C")
        .with("arr", vec!["😀".to_string(), "é".to_string()]);
    let bytes = to_vec(&context, "03", '0', [&record]).unwrap();
    assert_eq!(from_slice(&context, &bytes).unwrap(), vec![record]);
}

#[test]
fn test_null_defaults_on_write() {
    let context = context_with(&[
        ("s", FieldType::String),
        ("b", FieldType::Boolean),
        ("l", FieldType::Long),
        ("d", FieldType::Double),
        ("arr", FieldType::List),
        ("m", FieldType::Map),
    ]);
    let bytes = to_vec(&context, "03", '0', [&DynamicRecord::with_version("03.0.0")]).unwrap();
    assert_eq!(bytes, b"030\n0\x010\x010\x010\x01\x01\n");
}

#[test]
fn test_json_definition_drives_codec() {
    let definition = SchemaDefinition::from_json(
        r#"{
            "majorVersion": 3,
            "minorVersion": 0,
            "variantNumber": "0",
            "fields": [
                {"name": "s", "type": "string"},
                {"name": "i", "type": "int"},
                {"name": "arr", "type": "array"}
            ]
        }"#,
    )
    .unwrap();
    let context = Context::builder()
        .with_definition(definition)
        .unwrap()
        .build()
        .unwrap();

    let record = decode_one(&context, b"0ABC\x0142\x01a\x02b\n");
    assert_eq!(record.get("s"), Some(&FieldValue::from("ABC")));
    assert_eq!(record.get("i"), Some(&FieldValue::Integer(42)));
    assert_eq!(
        record.get("arr"),
        Some(&FieldValue::List(vec!["a".to_string(), "b".to_string()]))
    );

    let json = serde_json::to_string(&record).unwrap();
    assert_eq!(
        json,
        r#"{"version":"03.0.0","fields":{"s":"ABC","i":42,"arr":["a","b"]}}"#
    );
}

fn text_context(charset: &'static Encoding) -> Context<DynamicRecord> {
    let schema = DynamicRecord::schema_builder("03", '0', '0')
        .dynamic_field("s", FieldType::String)
        .dynamic_field("arr", FieldType::List)
        .build()
        .unwrap();
    Context::builder()
        .with_charset(charset)
        .with_schema(schema)
        .build()
        .unwrap()
}

#[test]
fn test_gbk_stream() {
    let context = text_context(encoding_rs::GBK);
    let record = DynamicRecord::with_version("03.0.0")
        .with("s", "A币C")
        .with("arr", vec!["价".to_string(), "x".to_string()]);

    let bytes = to_vec(&context, "03", '0', [&record]).unwrap();
    assert_eq!(bytes, b"030\n0A\xB1\xD2C\x01\xBC\xDB\x02x\n");
    assert_ne!(bytes, to_vec(&text_context(encoding_rs::UTF_8), "03", '0', [&record]).unwrap());
    assert_eq!(from_slice(&context, &bytes).unwrap(), vec![record]);
}

#[test]
fn test_charset_by_label() {
    let context = Context::builder()
        .with_charset_label("latin1")
        .unwrap()
        .with_json_schema(
            r#"{"majorVersion": "03", "minorVersion": "0", "variant": "0",
                "fields": [{"name": "s", "type": "string"}]}"#,
        )
        .unwrap()
        .build()
        .unwrap();

    let record = decode_one(&context, b"0caf\xE9\n");
    assert_eq!(record.get("s"), Some(&FieldValue::from("café")));
}

#[test]
fn test_utf16_is_read_only() {
    let context = text_context(encoding_rs::UTF_16LE);
    let input: Vec<u8> = "030\n0hi\u{1}a\u{2}b\n"
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect();
    let records = from_slice(&context, &input).unwrap();
    assert_eq!(records[0].get("s"), Some(&FieldValue::from("hi")));
    assert_eq!(
        records[0].get("arr"),
        Some(&FieldValue::List(vec!["a".to_string(), "b".to_string()]))
    );

    let err = to_vec(&context, "03", '0', &records).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

