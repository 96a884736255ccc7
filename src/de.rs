//! BSV decoding.
//!
//! This module provides the [`Decoder`], which reads a BSV stream record by record.
//!
//! ## Overview
//!
//! - **Header**: the constructor reads the 2-character major version, the 1-character
//!   minor version and the line delimiter, and selects that version's schema family.
//! - **Records**: each line starts with a variant character that picks the schema; the
//!   schema's fields are then read in order and bound into a fresh record.
//! - **Resynchronization**: when a record fails (unknown variant, wrong delimiter,
//!   unparsable number, rejected binding) the rest of its line is discarded before the
//!   error is returned, so the next call starts on the next record.
//! - **I/O errors** are returned as-is and end decoding.
//!
//! ## Usage
//!
//! ```rust
//! use bsv_codec::{Context, DynamicRecord, FieldType, FieldValue};
//!
//! let schema = DynamicRecord::schema_builder("03", '0', '0')
//!     .dynamic_field("s", FieldType::String)
//!     .dynamic_field("i", FieldType::Integer)
//!     .dynamic_field("arr", FieldType::List)
//!     .build()
//!     .unwrap();
//! let context = Context::builder().with_schema(schema).build().unwrap();
//!
//! let input = b"030\n0ABC\x0142\x01a\x02b\n";
//! let mut decoder = context.decoder(&input[..]).unwrap();
//!
//! let record = decoder.next_record().unwrap().unwrap();
//! assert_eq!(record.get("s"), Some(&FieldValue::from("ABC")));
//! assert_eq!(record.get("i"), Some(&FieldValue::Integer(42)));
//! assert_eq!(
//!     record.get("arr"),
//!     Some(&FieldValue::List(vec!["a".to_string(), "b".to_string()]))
//! );
//! assert!(decoder.next_record().unwrap().is_none());
//! ```

use crate::token::TokenReader;
use crate::{
    Context, Error, Field, FieldType, FieldValue, Record, Result, SchemaFamily, StringMap,
    Terminator,
};
use std::io::{BufRead, BufReader, Read};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Ready,
    Exhausted,
    Failed,
}

/// Reads records from a BSV stream.
///
/// Created with [`Decoder::new`] or [`Context::decoder`]. Also usable as an
/// [`Iterator`] of `Result<T>`.
pub struct Decoder<'c, T, R> {
    family: &'c SchemaFamily<T>,
    tokens: TokenReader<'c, BufReader<R>>,
    state: State,
}

impl<'c, T: Record, R: Read> Decoder<'c, T, R> {
    /// Reads the version header from `reader` and resolves its schema family.
    ///
    /// # Errors
    ///
    /// - [`Error::Header`] if the header is truncated or not closed by the line delimiter
    /// - [`Error::SchemaResolution`] if no schemas exist for the header's version
    /// - [`Error::Io`] on read failure
    pub fn new(context: &'c Context<T>, reader: R) -> Result<Self> {
        let mut tokens = TokenReader::new(
            BufReader::new(reader),
            context.charset(),
            *context.delimiters(),
            context.transcoder(),
        );

        let mut header = [' '; 4];
        for (i, slot) in header.iter_mut().enumerate() {
            *slot = tokens.read_char()?.ok_or_else(|| {
                Error::header(format!("stream ended after {} header characters", i))
            })?;
        }
        let [m1, m2, minor, delimiter] = header;
        if delimiter != context.delimiters().line {
            return Err(Error::header(format!(
                "expected line delimiter {:?} after version, found {:?}",
                context.delimiters().line,
                delimiter
            )));
        }

        let major: String = [m1, m2].iter().collect();
        let family = context.schemas(&major, minor)?;
        log::debug!("opened BSV stream for version {}.{}", major, minor);

        Ok(Decoder {
            family,
            tokens,
            state: State::Ready,
        })
    }

    /// The stream's `(major, minor)` version, from its header.
    pub fn version(&self) -> (&str, char) {
        (self.family.major_version(), self.family.minor_version())
    }

    /// 1-based number of the line about to be read (the header is line 1).
    pub fn line(&self) -> usize {
        self.tokens.line()
    }

    /// Decodes the next record.
    ///
    /// Returns `Ok(None)` once the stream is exhausted. A record-level error leaves the
    /// decoder positioned at the next line, so calling again continues with the next
    /// record.
    ///
    /// # Errors
    ///
    /// Record-level errors (see [`Error::is_recoverable`]) for a bad line, or
    /// [`Error::Io`] if the source failed. After an I/O error every call returns
    /// `Ok(None)`.
    pub fn next_record(&mut self) -> Result<Option<T>> {
        if self.state != State::Ready {
            return Ok(None);
        }

        let line = self.tokens.line();
        match self.decode_record() {
            Ok(None) => {
                self.state = State::Exhausted;
                log::debug!("BSV stream exhausted after {} lines", line - 1);
                Ok(None)
            }
            Ok(Some(record)) => Ok(Some(record)),
            Err(err) if err.is_recoverable() => {
                let discarded = self.tokens.skip_line().map_err(|io| {
                    self.state = State::Failed;
                    io
                })?;
                log::error!("discarding line {}: {}", line, err);
                log::error!("discarded raw data: {:?}", discarded);
                Err(err)
            }
            Err(err) => {
                self.state = State::Failed;
                Err(err)
            }
        }
    }

    fn decode_record(&mut self) -> Result<Option<T>> {
        let variant = match self.tokens.read_char()? {
            Some(ch) => ch,
            None => return Ok(None),
        };
        let schema = self.family.resolve(variant)?;

        let mut record = schema.new_record();
        let fields = schema.fields();
        for (i, field) in fields.iter().enumerate() {
            let has_more = i + 1 < fields.len();
            let value = decode_field(&mut self.tokens, field, has_more)?;
            field.set(&mut record, value)?;
        }
        Ok(Some(record))
    }

    /// Releases the underlying reader. Buffered but unread bytes are lost.
    pub fn into_inner(self) -> R {
        self.tokens.into_inner().into_inner()
    }

    /// Closes the stream.
    pub fn close(self) {
        log::debug!("closing BSV decoder at line {}", self.tokens.line());
    }
}

impl<'c, T: Record, R: Read> Iterator for Decoder<'c, T, R> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

fn expect_close<R: BufRead, T>(
    tokens: &TokenReader<'_, R>,
    field: &Field<T>,
    found: Terminator,
    has_more: bool,
) -> Result<()> {
    let ok = if has_more {
        found == Terminator::Field
    } else {
        found.ends_line()
    };
    if ok {
        return Ok(());
    }
    let expected = if has_more {
        Terminator::Field.as_str()
    } else {
        "line delimiter or end of stream"
    };
    Err(Error::delimiter_mismatch(
        field.name(),
        expected,
        found.as_str(),
        tokens.token(),
    ))
}

fn parse_number<N>(field_type: FieldType, field_name: &str, token: &str) -> Result<Option<N>>
where
    N: FromStr,
    N::Err: std::fmt::Display,
{
    if token.is_empty() {
        return Ok(None);
    }
    token
        .parse::<N>()
        .map(Some)
        .map_err(|e| Error::value_format(field_name, field_type.as_str(), token, e))
}

/// Reads one field's value. `has_more` tells whether the field must be closed by a field
/// delimiter (more fields follow) or by the end of the line.
pub(crate) fn decode_field<R, T>(
    tokens: &mut TokenReader<'_, R>,
    field: &Field<T>,
    has_more: bool,
) -> Result<FieldValue>
where
    R: BufRead,
{
    let field_type = field.field_type();
    match field_type {
        FieldType::String => {
            let end = tokens.next_token()?;
            expect_close(tokens, field, end, has_more)?;
            Ok(FieldValue::String(tokens.take_token()))
        }
        FieldType::Boolean => {
            let end = tokens.next_token()?;
            expect_close(tokens, field, end, has_more)?;
            // Only "1" is true; anything else, malformed included, is false
            Ok(FieldValue::Bool(tokens.token() == "1"))
        }
        FieldType::Integer | FieldType::Long | FieldType::Float | FieldType::Double => {
            let end = tokens.next_token()?;
            expect_close(tokens, field, end, has_more)?;
            let token = tokens.token();
            let value = match field_type {
                FieldType::Integer => {
                    parse_number::<i32>(field_type, field.name(), token)?.map(FieldValue::Integer)
                }
                FieldType::Long => {
                    parse_number::<i64>(field_type, field.name(), token)?.map(FieldValue::Long)
                }
                FieldType::Float => {
                    parse_number::<f32>(field_type, field.name(), token)?.map(FieldValue::Float)
                }
                _ => parse_number::<f64>(field_type, field.name(), token)?.map(FieldValue::Double),
            };
            Ok(value.unwrap_or(FieldValue::Null))
        }
        FieldType::List => {
            let mut items = Vec::new();
            loop {
                let end = tokens.next_token()?;
                items.push(tokens.take_token());
                if end != Terminator::Item {
                    expect_close(tokens, field, end, has_more)?;
                    break;
                }
            }
            Ok(FieldValue::List(items))
        }
        FieldType::Map => {
            let mut map = StringMap::new();
            loop {
                let end = tokens.next_token()?;
                if end != Terminator::KeyValue {
                    expect_close(tokens, field, end, has_more)?;
                    break;
                }
                let key = tokens.take_token();
                let end = tokens.next_token()?;
                map.insert(key, tokens.take_token());
                if end != Terminator::Item {
                    expect_close(tokens, field, end, has_more)?;
                    break;
                }
            }
            Ok(FieldValue::Map(map))
        }
    }
}
