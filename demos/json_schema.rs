//! Schemas loaded from JSON, decoding a stream with a corrupt line.
//!
//! Run with: RUST_LOG=error cargo run --example json_schema

use bsv_codec::{to_vec, Context, DynamicRecord, FieldValue, Record, StringMap};
use std::error::Error;

const ORDER: &str = r#"{
    "majorVersion": "02",
    "minorVersion": "1",
    "variant": "o",
    "fields": [
        {"name": "id", "type": "LONG"},
        {"name": "item", "type": "STRING"},
        {"name": "quantity", "type": "int"},
        {"name": "attributes", "type": "MAP"}
    ]
}"#;

const CANCEL: &str = r#"{
    "majorVersion": 2,
    "minorVersion": 1,
    "variantNumber": "c",
    "fields": [
        {"name": "id", "type": "long"},
        {"name": "reason", "type": "string"}
    ]
}"#;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let context = Context::builder()
        .with_json_schema(ORDER)?
        .with_json_schema(CANCEL)?
        .build()?;

    let mut attributes = StringMap::new();
    attributes.insert("color".to_string(), "red".to_string());
    let order = DynamicRecord::with_version("02.1.o")
        .with("id", 1i64)
        .with("item", "lamp")
        .with("quantity", 2i32)
        .with("attributes", attributes);
    let cancel = DynamicRecord::with_version("02.1.c")
        .with("id", 1i64)
        .with("reason", "changed mind");

    let mut bytes = to_vec(&context, "02", '1', [&order, &cancel])?;
    // a line with a quantity that is not a number, before the cancellation
    let corrupt = b"o2\x01chair\x01many\x01\n";
    let split = bytes
        .windows(2)
        .position(|w| w == b"\nc")
        .map_or(bytes.len(), |i| i + 1);
    bytes.splice(split..split, corrupt.iter().copied());

    for (line, result) in context.decoder(&bytes[..])?.enumerate() {
        match result {
            Ok(record) => {
                let id = record.get("id").and_then(FieldValue::as_i64);
                println!("record {}: version {} id {:?}", line + 1, record.version(), id);
                println!("  {}", serde_json::to_string(&record)?);
            }
            Err(err) => println!("record {}: skipped ({})", line + 1, err),
        }
    }

    Ok(())
}

