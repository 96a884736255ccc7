//! BSV encoding.
//!
//! This module provides the [`Encoder`], which writes records to a BSV stream.
//!
//! ## Overview
//!
//! - **Header**: the stream is opened for one major.minor version, written once as the
//!   first line.
//! - **Records**: each record's declared version must belong to that major.minor; its
//!   variant selects the schema, whose fields are written in order.
//! - **Defaults**: absent values are written as the declared type's default (empty
//!   string, `0`, empty list or map).
//! - **No partial-line recovery**: if a record fails half way, what was written stays in
//!   the buffer. Callers that need atomic records should encode into a scratch buffer.
//!
//! ## Usage
//!
//! ```rust
//! use bsv_codec::{Context, DynamicRecord, FieldType};
//!
//! let schema = DynamicRecord::schema_builder("03", '0', '0')
//!     .dynamic_field("s", FieldType::String)
//!     .dynamic_field("i", FieldType::Integer)
//!     .build()
//!     .unwrap();
//! let context = Context::builder().with_schema(schema).build().unwrap();
//!
//! let mut encoder = context.encoder(Vec::new(), "03", '0').unwrap();
//! encoder
//!     .write(&DynamicRecord::with_version("03.0.0").with("s", "ABC").with("i", 42i32))
//!     .unwrap();
//! let bytes = encoder.close().unwrap();
//! assert_eq!(bytes, b"030\n0ABC\x0142\n");
//! ```

use crate::schema::check_major;
use crate::token::TokenWriter;
use crate::{
    Context, Error, Field, FieldType, FieldValue, Record, Result, SchemaFamily, Terminator,
    Version,
};
use std::io::Write;

/// Writes records to a BSV stream.
///
/// Created with [`Encoder::new`] or [`Context::encoder`]. [`Encoder::close`] flushes and
/// hands back the sink; dropping the encoder also flushes, ignoring errors.
pub struct Encoder<'c, T, W: Write> {
    family: &'c SchemaFamily<T>,
    tokens: TokenWriter<'c, W>,
    records: u64,
}

impl<'c, T: Record, W: Write> Encoder<'c, T, W> {
    /// Opens a stream for version `major.minor` and writes its header.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if the context's charset cannot be written
    /// - [`Error::Header`] if `major` is not exactly two characters
    /// - [`Error::SchemaResolution`] if no schemas exist for `major.minor`
    /// - [`Error::Unmappable`] if the charset cannot encode the header
    /// - [`Error::Io`] if the header cannot be written
    pub fn new(context: &'c Context<T>, writer: W, major: &str, minor: char) -> Result<Self> {
        let charset = context.charset();
        if charset.output_encoding() != charset {
            return Err(Error::invalid_config(format!(
                "charset {} can be read but not written",
                charset.name()
            )));
        }
        check_major(major).map_err(|_| {
            Error::header(format!("major version '{}' is not two characters", major))
        })?;
        let family = context.schemas(major, minor)?;

        let mut tokens = TokenWriter::new(
            writer,
            charset,
            *context.delimiters(),
            context.transcoder(),
        );
        for ch in major.chars() {
            tokens.write_verbatim(ch)?;
        }
        tokens.write_verbatim(minor)?;
        tokens.write_delimiter(Terminator::Line)?;
        log::debug!("opened BSV stream for version {}.{}", major, minor);

        Ok(Encoder {
            family,
            tokens,
            records: 0,
        })
    }

    /// The stream's `(major, minor)` version.
    pub fn version(&self) -> (&str, char) {
        (self.family.major_version(), self.family.minor_version())
    }

    /// Number of records written successfully.
    pub fn records_written(&self) -> u64 {
        self.records
    }

    /// Writes one record as a line.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidVersion`] if the record's version is not `MM.n.v` for this
    ///   stream's major.minor
    /// - [`Error::SchemaResolution`] if its variant has no schema
    /// - [`Error::Binding`] if a getter returns a value of the wrong type
    /// - [`Error::UnescapedDelimiter`] if a value contains an untranscoded delimiter
    /// - [`Error::ReservedSubstitute`] if a value contains a transcoding substitute
    /// - [`Error::Unmappable`] if the charset cannot encode a value's character
    /// - [`Error::Io`] on write failure
    pub fn write(&mut self, record: &T) -> Result<()> {
        let result = self.write_record(record);
        match &result {
            Ok(()) => self.records += 1,
            Err(err) => log::error!("discarding record {}: {}", record.version(), err),
        }
        result
    }

    fn write_record(&mut self, record: &T) -> Result<()> {
        let declared = record.version();
        let version = Version::parse(declared).ok().filter(|v| {
            v.major == self.family.major_version() && v.minor == self.family.minor_version()
        });
        let version = version.ok_or_else(|| Error::InvalidVersion {
            version: declared.to_string(),
            expected: format!(
                "{}.{}",
                self.family.major_version(),
                self.family.minor_version()
            ),
        })?;
        let schema = self.family.resolve(version.variant)?;

        self.tokens.write_verbatim(version.variant)?;
        let fields = schema.fields();
        for (i, field) in fields.iter().enumerate() {
            let has_more = i + 1 < fields.len();
            encode_field(&mut self.tokens, field, field.get(record), has_more)
                .map_err(|e| e.in_field(field.name()))?;
        }
        Ok(())
    }

    /// Flushes buffered output to the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.tokens.flush()
    }

    /// The sink, as far as it has been written. Buffered output is not included.
    pub fn get_ref(&self) -> &W {
        self.tokens.get_ref()
    }

    /// Flushes and releases the sink.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the final flush fails.
    pub fn close(self) -> Result<W> {
        log::debug!("closing BSV encoder after {} records", self.records);
        self.tokens.into_inner()
    }
}

fn wrong_type(field_type: FieldType, value: &FieldValue) -> Error {
    let found = value.field_type().map_or("NULL", FieldType::as_str);
    Error::binding("", format!("expected {}, found {}", field_type, found))
}

/// Writes one field's value followed by its closing delimiter.
pub(crate) fn encode_field<W: Write, T>(
    tokens: &mut TokenWriter<'_, W>,
    field: &Field<T>,
    value: FieldValue,
    has_more: bool,
) -> Result<()> {
    let field_type = field.field_type();
    match (field_type, value) {
        (FieldType::String, FieldValue::String(s)) => tokens.write_text(&s)?,
        (FieldType::String, FieldValue::Null) => {}
        (FieldType::Boolean, FieldValue::Bool(true)) => tokens.write_raw("1")?,
        (FieldType::Boolean, FieldValue::Bool(false) | FieldValue::Null) => {
            tokens.write_raw("0")?
        }
        (FieldType::Integer, FieldValue::Integer(v)) => tokens.write_raw(&v.to_string())?,
        (FieldType::Integer, FieldValue::Null) => tokens.write_raw("0")?,
        (FieldType::Long, FieldValue::Long(v)) => tokens.write_raw(&v.to_string())?,
        (FieldType::Long, FieldValue::Integer(v)) => tokens.write_raw(&v.to_string())?,
        (FieldType::Long, FieldValue::Null) => tokens.write_raw("0")?,
        (FieldType::Float, FieldValue::Float(v)) => tokens.write_raw(&v.to_string())?,
        (FieldType::Float, FieldValue::Null) => tokens.write_raw("0")?,
        (FieldType::Double, FieldValue::Double(v)) => tokens.write_raw(&v.to_string())?,
        (FieldType::Double, FieldValue::Float(v)) => {
            tokens.write_raw(&f64::from(v).to_string())?
        }
        (FieldType::Double, FieldValue::Null) => tokens.write_raw("0")?,
        (FieldType::List, FieldValue::List(items)) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    tokens.write_delimiter(Terminator::Item)?;
                }
                tokens.write_text(item)?;
            }
        }
        (FieldType::List, FieldValue::Null) => {}
        (FieldType::Map, FieldValue::Map(map)) => {
            for (i, (key, value)) in map.iter().enumerate() {
                if i > 0 {
                    tokens.write_delimiter(Terminator::Item)?;
                }
                tokens.write_text(key)?;
                tokens.write_delimiter(Terminator::KeyValue)?;
                tokens.write_text(value)?;
            }
        }
        (FieldType::Map, FieldValue::Null) => {}
        (field_type, other) => return Err(wrong_type(field_type, &other)),
    }

    tokens.write_delimiter(if has_more {
        Terminator::Field
    } else {
        Terminator::Line
    })
}
