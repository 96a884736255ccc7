//! # bsv_codec
//!
//! A streaming codec for BSV, a schema-driven, delimiter-separated record format.
//!
//! ## What is BSV?
//!
//! A BSV stream is a one-line version header followed by one record per line. Fields are
//! separated by control characters rather than commas, so ordinary text never needs
//! quoting:
//!
//! ```text
//! <2-char major><1-char minor><LF>
//! <variant><field 1><0x01><field 2><0x01>...<field N><LF>
//! ```
//!
//! The header fixes a **major.minor version**; the first character of each line selects
//! one of that version's **variants**, and the variant's [`Schema`] gives the typed field
//! layout of the rest of the line.
//!
//! ## Key Features
//!
//! - **Typed fields**: `STRING`, `BOOLEAN`, `INTEGER`, `LONG`, `FLOAT`, `DOUBLE`, `LIST`
//!   (items joined by `0x02`) and `MAP` (`key 0x03 value` pairs joined by `0x02`)
//! - **Mixed streams**: any number of variants may be interleaved under one header
//! - **Transcoding**: characters that clash with delimiters are substituted on write and
//!   restored on read, with ambiguous configurations rejected up front
//! - **Charsets**: streams are UTF-8 by default; any WHATWG encoding, such as GBK or
//!   windows-1252, can be selected on the [`Context`]
//! - **Line-level recovery**: a malformed line yields an error and decoding resumes at the
//!   next line
//! - **Any record type**: fields bind through getter and setter closures, so the codec
//!   never inspects your types
//!
//! ## Quick Start
//!
//! ```rust
//! use bsv_codec::{bsv_schema, from_slice, to_vec, Context, Record};
//!
//! #[derive(Default, Debug, Clone, PartialEq)]
//! struct Quote {
//!     version: String,
//!     symbol: String,
//!     bid: Option<f64>,
//!     venues: Vec<String>,
//! }
//!
//! impl Record for Quote {
//!     fn version(&self) -> &str {
//!         &self.version
//!     }
//!     fn set_version(&mut self, version: &str) {
//!         self.version = version.to_string();
//!     }
//! }
//!
//! let schema = bsv_schema!(Quote, "03", '0', '0', {
//!     symbol: String,
//!     bid: Double,
//!     venues: List,
//! })
//! .unwrap();
//! let context = Context::builder().with_schema(schema).build().unwrap();
//!
//! let quote = Quote {
//!     version: "03.0.0".to_string(),
//!     symbol: "ABC".to_string(),
//!     bid: Some(10.25),
//!     venues: vec!["X".to_string(), "Y".to_string()],
//! };
//!
//! let bytes = to_vec(&context, "03", '0', [&quote]).unwrap();
//! assert_eq!(bytes, b"030\n0ABC\x0110.25\x01X\x02Y\n");
//!
//! let quotes: Vec<Quote> = from_slice(&context, &bytes).unwrap();
//! assert_eq!(quotes, vec![quote]);
//! ```
//!
//! ### Streaming with recovery
//!
//! ```rust
//! use bsv_codec::{Context, DynamicRecord, FieldType, FieldValue};
//!
//! let context = Context::builder()
//!     .with_json_schema(
//!         r#"{"majorVersion": "03", "minorVersion": "0", "variant": "0",
//!             "fields": [{"name": "n", "type": "INTEGER"}]}"#,
//!     )
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let input = b"030\n01\n0oops\n03\n";
//! let results: Vec<_> = context.decoder(&input[..]).unwrap().collect();
//!
//! assert_eq!(results.len(), 3);
//! assert_eq!(results[0].as_ref().unwrap().get("n"), Some(&FieldValue::Integer(1)));
//! assert!(results[1].is_err());
//! assert_eq!(results[2].as_ref().unwrap().get("n"), Some(&FieldValue::Integer(3)));
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: discarded lines and records at `error`
//! level, stream lifecycle and schema registration at `debug`. Install any logger, such as
//! `env_logger`, to see them.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - typed records with `bsv_schema!`, written and read back
//! - **`json_schema.rs`** - schemas loaded from JSON, with a corrupt line skipped
//!
//! Run any example with: `cargo run --example <name>`

pub mod context;
pub mod de;
pub mod definition;
pub mod error;
pub mod macros;
pub mod options;
pub mod record;
pub mod registry;
pub mod schema;
pub mod ser;
pub mod token;
pub mod transcode;
pub mod value;

pub use context::{Context, ContextBuilder};
pub use encoding_rs::Encoding;
pub use de::Decoder;
pub use definition::{FieldDefinition, SchemaDefinition};
pub use error::{Error, Result};
pub use options::{Delimiters, Terminator};
pub use record::DynamicRecord;
pub use registry::{Registry, SchemaFamily};
pub use schema::{Factory, Field, Getter, Record, Schema, SchemaBuilder, Setter, Version};
pub use ser::Encoder;
pub use transcode::Transcoder;
pub use value::{FieldType, FieldValue, StringMap};

use std::io;

/// Encodes `records` as a complete BSV stream for version `major.minor`.
///
/// # Examples
///
/// ```rust
/// use bsv_codec::{to_vec, Context, DynamicRecord, FieldType};
///
/// let schema = DynamicRecord::schema_builder("01", '0', 'a')
///     .dynamic_field("flag", FieldType::Boolean)
///     .build()
///     .unwrap();
/// let context = Context::builder().with_schema(schema).build().unwrap();
///
/// let record = DynamicRecord::with_version("01.0.a").with("flag", true);
/// assert_eq!(to_vec(&context, "01", '0', [&record]).unwrap(), b"010\na1\n");
/// ```
///
/// # Errors
///
/// Returns the first error raised while opening the stream or writing a record.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<'r, T, I>(
    context: &Context<T>,
    major: &str,
    minor: char,
    records: I,
) -> Result<Vec<u8>>
where
    T: Record + 'r,
    I: IntoIterator<Item = &'r T>,
{
    to_writer(context, Vec::new(), major, minor, records)
}

/// Encodes `records` as a complete BSV stream to `writer`, returning the writer.
///
/// # Errors
///
/// Returns the first error raised while opening the stream, writing a record or flushing.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<'r, T, W, I>(
    context: &Context<T>,
    writer: W,
    major: &str,
    minor: char,
    records: I,
) -> Result<W>
where
    T: Record + 'r,
    W: io::Write,
    I: IntoIterator<Item = &'r T>,
{
    let mut encoder = context.encoder(writer, major, minor)?;
    for record in records {
        encoder.write(record)?;
    }
    encoder.close()
}

/// Decodes every record of a complete BSV stream held in memory.
///
/// This is strict: the first malformed line fails the whole call. Use
/// [`Context::decoder`] to skip bad lines instead.
///
/// # Errors
///
/// Returns the first header, record or I/O error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T: Record>(context: &Context<T>, bytes: &[u8]) -> Result<Vec<T>> {
    from_reader(context, bytes)
}

/// Decodes every record of a complete BSV stream read from `reader`.
///
/// # Errors
///
/// Returns the first header, record or I/O error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<T, R>(context: &Context<T>, reader: R) -> Result<Vec<T>>
where
    T: Record,
    R: io::Read,
{
    context.decoder(reader)?.collect()
}
