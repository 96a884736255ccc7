use bsv_codec::{bsv_schema, from_slice, to_vec, Context, Error, FieldType, Record, StringMap};
use std::collections::HashMap;

#[derive(Default, Debug, Clone, PartialEq)]
struct Everything {
    version: String,
    text: String,
    on: bool,
    small: Option<i32>,
    big: Option<i64>,
    single: Option<f32>,
    double: Option<f64>,
    items: Vec<String>,
    pairs: HashMap<String, String>,
}

impl Record for Everything {
    fn version(&self) -> &str {
        &self.version
    }

    fn set_version(&mut self, version: &str) {
        self.version = version.to_string();
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
struct Required {
    version: String,
    id: i64,
    labels: StringMap,
}

impl Record for Required {
    fn version(&self) -> &str {
        &self.version
    }

    fn set_version(&mut self, version: &str) {
        self.version = version.to_string();
    }
}

#[test]
fn test_bsv_schema_every_type() {
    let schema = bsv_schema!(Everything, "10", '2', 'e', {
        text: String,
        on: Boolean,
        small: Integer,
        big: Long,
        single: Float,
        double: Double,
        items: List,
        pairs: Map,
    })
    .unwrap();

    let types: Vec<FieldType> = schema.fields().iter().map(|f| f.field_type()).collect();
    assert_eq!(types, FieldType::ALL.to_vec());
    assert_eq!(schema.full_version(), "10.2.e");
}

#[test]
fn test_bsv_schema_round_trip() {
    let schema = bsv_schema!(Everything, "10", '2', 'e', {
        text: String,
        on: Boolean,
        small: Integer,
        big: Long,
        single: Float,
        double: Double,
        items: List,
        pairs: Map,
    })
    .unwrap();
    let context = Context::builder().with_schema(schema).build().unwrap();

    let mut pairs = HashMap::new();
    pairs.insert("x".to_string(), "1".to_string());
    let value = Everything {
        version: "10.2.e".to_string(),
        text: "hello".to_string(),
        on: true,
        small: Some(-5),
        big: Some(1 << 40),
        single: Some(0.25),
        double: Some(-1e-3),
        items: vec!["p".to_string(), "q".to_string()],
        pairs,
    };

    let bytes = to_vec(&context, "10", '2', [&value]).unwrap();
    assert_eq!(from_slice(&context, &bytes).unwrap(), vec![value]);
}

#[test]
fn test_required_numeric_rejects_absent_token() {
    let schema = bsv_schema!(Required, "01", '0', '0', { id: Long, labels: Map }).unwrap();
    let context = Context::builder().with_schema(schema).build().unwrap();

    let records = from_slice(&context, b"010\n042\x01k\x03v\n").unwrap();
    assert_eq!(records[0].id, 42);
    assert_eq!(records[0].labels.get("k").map(String::as_str), Some("v"));

    let err = from_slice(&context, b"010\n0\x01\n").unwrap_err();
    assert_eq!(err, Error::binding("id", "expected LONG, found NULL"));
}

#[test]
fn test_bsv_schema_trailing_comma_optional() {
    assert!(bsv_schema!(Required, "01", '0', '0', { id: Long }).is_ok());
    assert!(bsv_schema!(Required, "01", '0', '0', { id: Long, }).is_ok());
}
