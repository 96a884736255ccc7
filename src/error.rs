//! Error types for BSV encoding and decoding.
//!
//! Errors fall into two groups:
//!
//! - **Record-level** errors (schema resolution, delimiter mismatch, value format,
//!   binding, unencodable characters, record versions) affect a single record. On the
//!   decode side the [`Decoder`](crate::Decoder) resynchronizes to the next line before
//!   surfacing them, so decoding may simply continue.
//! - **Fatal** errors (I/O, malformed headers, invalid configuration) mean the stream
//!   or the [`Context`](crate::Context) cannot be used.
//!
//! [`Error::is_recoverable`] tells the two apart.
//!
//! ## Examples
//!
//! ```rust
//! use bsv_codec::Error;
//!
//! let err = Error::value_format("i", "INTEGER", "4x2", "invalid digit found in string");
//! assert!(err.is_recoverable());
//! assert!(err.to_string().contains("field 'i'"));
//!
//! let err = Error::header("expected line delimiter after version");
//! assert!(!err.is_recoverable());
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding or decoding BSV streams.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Underlying stream failure. Always fatal.
    #[error("IO error ({kind:?}): {msg}")]
    Io { kind: io::ErrorKind, msg: String },

    /// Missing or malformed version header.
    #[error("Invalid header: {0}")]
    Header(String),

    /// No schema family for a major.minor version, or no schema for a variant.
    #[error("Schema resolution failed: {0}")]
    SchemaResolution(String),

    /// A record declared a version that does not belong to the open stream.
    #[error("Invalid record version '{version}', stream is open for {expected}")]
    InvalidVersion { version: String, expected: String },

    /// A token was closed by an unexpected delimiter.
    #[error(
        "Delimiter mismatch in field '{field}': expected {expected}, found {found} \
         (token: {token:?})"
    )]
    DelimiterMismatch {
        field: String,
        expected: String,
        found: String,
        token: String,
    },

    /// A token could not be parsed as the declared field type.
    #[error("Invalid {field_type} value in field '{field}': {token:?} ({msg})")]
    ValueFormat {
        field: String,
        field_type: String,
        token: String,
        msg: String,
    },

    /// A record accessor rejected a value.
    #[error("Binding failed for field '{field}': {msg}")]
    Binding { field: String, msg: String },

    /// A value contains a structural delimiter that has no transcoding.
    #[error("Field '{field}' contains structural delimiter {ch:?} with no transcoding")]
    UnescapedDelimiter { field: String, ch: char },

    /// A value contains a transcoding substitute, which would read back as its original.
    #[error("Field '{field}' contains {ch:?}, which is reserved as a transcoding substitute")]
    ReservedSubstitute { field: String, ch: char },

    /// A value contains a character the stream's charset cannot encode.
    #[error("Field '{field}' contains {ch:?}, which {charset} cannot encode")]
    Unmappable {
        field: String,
        ch: char,
        charset: String,
    },

    /// The context or a schema was configured inconsistently.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Creates a header error.
    pub fn header<T: fmt::Display>(msg: T) -> Self {
        Error::Header(msg.to_string())
    }

    /// Creates a schema resolution error.
    pub fn schema_resolution<T: fmt::Display>(msg: T) -> Self {
        Error::SchemaResolution(msg.to_string())
    }

    /// Creates a delimiter mismatch error for `field`.
    pub fn delimiter_mismatch(field: &str, expected: &str, found: &str, token: &str) -> Self {
        Error::DelimiterMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
            token: token.to_string(),
        }
    }

    /// Creates a value format error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bsv_codec::Error;
    ///
    /// let err = Error::value_format("price", "DOUBLE", "abc", "invalid float literal");
    /// assert!(err.to_string().contains("DOUBLE"));
    /// ```
    pub fn value_format<T: fmt::Display>(
        field: &str,
        field_type: &str,
        token: &str,
        msg: T,
    ) -> Self {
        Error::ValueFormat {
            field: field.to_string(),
            field_type: field_type.to_string(),
            token: token.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates a binding error. An empty `field` is filled in by the codec once the
    /// failing field is known.
    pub fn binding<T: fmt::Display>(field: &str, msg: T) -> Self {
        Error::Binding {
            field: field.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidConfig(msg.to_string())
    }

    /// Returns `true` for errors that only affect the current record.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bsv_codec::Error;
    ///
    /// assert!(Error::schema_resolution("no schema for variant 'x'").is_recoverable());
    /// let io: Error = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone").into();
    /// assert!(!io.is_recoverable());
    /// ```
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::SchemaResolution(_)
                | Error::InvalidVersion { .. }
                | Error::DelimiterMismatch { .. }
                | Error::ValueFormat { .. }
                | Error::Binding { .. }
                | Error::UnescapedDelimiter { .. }
                | Error::ReservedSubstitute { .. }
                | Error::Unmappable { .. }
        )
    }

    /// Returns `true` for I/O failures of the underlying stream.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io { .. })
    }

    /// Stamps `name` on field-level errors that were raised before the field was known.
    #[must_use]
    pub(crate) fn in_field(self, name: &str) -> Self {
        match self {
            Error::Binding { field, msg } if field.is_empty() => Error::Binding {
                field: name.to_string(),
                msg,
            },
            Error::UnescapedDelimiter { field, ch } if field.is_empty() => {
                Error::UnescapedDelimiter {
                    field: name.to_string(),
                    ch,
                }
            }
            Error::ReservedSubstitute { field, ch } if field.is_empty() => {
                Error::ReservedSubstitute {
                    field: name.to_string(),
                    ch,
                }
            }
            Error::Unmappable { field, ch, charset } if field.is_empty() => Error::Unmappable {
                field: name.to_string(),
                ch,
                charset,
            },
            other => other,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io {
            kind: err.kind(),
            msg: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
