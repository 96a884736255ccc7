//! Typed records written to and read back from a BSV stream.
//!
//! Run with: RUST_LOG=debug cargo run --example simple

use bsv_codec::{bsv_schema, Context, Record};
use std::error::Error;

#[derive(Debug, Default, Clone, PartialEq)]
struct Reading {
    version: String,
    sensor: String,
    celsius: Option<f64>,
    tags: Vec<String>,
}

impl Record for Reading {
    fn version(&self) -> &str {
        &self.version
    }

    fn set_version(&mut self, version: &str) {
        self.version = version.to_string();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let schema = bsv_schema!(Reading, "01", '0', 'r', {
        sensor: String,
        celsius: Double,
        tags: List,
    })?;
    let context = Context::builder()
        .with_transcoding('\n', '\u{1e}')
        .with_schema(schema)
        .build()?;

    let readings = vec![
        Reading {
            version: "01.0.r".to_string(),
            sensor: "roof".to_string(),
            celsius: Some(21.5),
            tags: vec!["outdoor".to_string()],
        },
        Reading {
            version: "01.0.r".to_string(),
            sensor: "cellar\nnorth wall".to_string(),
            celsius: Some(-3.25),
            tags: vec!["indoor".to_string(), "damp".to_string()],
        },
    ];

    let mut encoder = context.encoder(Vec::new(), "01", '0')?;
    for reading in &readings {
        encoder.write(reading)?;
    }
    let bytes = encoder.close()?;
    println!("BSV output ({} bytes): {:?}\n", bytes.len(), String::from_utf8_lossy(&bytes));

    let mut decoder = context.decoder(&bytes[..])?;
    let mut decoded = Vec::new();
    while let Some(reading) = decoder.next_record()? {
        println!("{:?}", reading);
        decoded.push(reading);
    }
    assert_eq!(readings, decoded);
    println!("✓ Round-trip successful");

    Ok(())
}
