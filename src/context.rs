//! The immutable codec configuration shared by decoders and encoders.
//!
//! A [`Context`] bundles the [`Delimiters`], the [`Transcoder`], the stream charset and
//! the schema [`Registry`]. It is built once with [`ContextBuilder`], validated as a
//! whole, and then only read: any number of decoders and encoders may borrow it, from
//! any thread.
//!
//! ## Examples
//!
//! ```rust
//! use bsv_codec::{Context, DynamicRecord, FieldType};
//!
//! let schema = DynamicRecord::schema_builder("03", '0', '0')
//!     .dynamic_field("s", FieldType::String)
//!     .build()
//!     .unwrap();
//!
//! let context = Context::builder()
//!     .with_line_delimiter('\n')
//!     .with_transcoding('\n', '\u{1e}')
//!     .with_schema(schema)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(context.registry().len(), 1);
//!
//! // Substitutes must not collide with structural delimiters
//! let result = Context::<DynamicRecord>::builder()
//!     .with_transcoding('x', '\u{1}')
//!     .build();
//! assert!(result.is_err());
//! ```

use crate::{
    Decoder, Delimiters, DynamicRecord, Encoder, Error, Record, Registry, Result, Schema,
    SchemaDefinition, SchemaFamily, Transcoder,
};
use encoding_rs::Encoding;
use std::io::{Read, Write};

/// Delimiters, transcoding and schemas for a family of BSV streams.
#[derive(Debug)]
pub struct Context<T> {
    delimiters: Delimiters,
    transcoder: Transcoder,
    charset: &'static Encoding,
    registry: Registry<T>,
}

impl<T> Context<T> {
    #[must_use]
    pub fn builder() -> ContextBuilder<T> {
        ContextBuilder::new()
    }

    #[inline]
    #[must_use]
    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    #[inline]
    #[must_use]
    pub fn transcoder(&self) -> &Transcoder {
        &self.transcoder
    }

    /// The byte encoding of streams, UTF-8 unless configured otherwise.
    #[inline]
    #[must_use]
    pub fn charset(&self) -> &'static Encoding {
        self.charset
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry<T> {
        &self.registry
    }

    /// The schemas registered for `major.minor`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaResolution`](crate::Error::SchemaResolution) if there are
    /// none.
    pub fn schemas(&self, major: &str, minor: char) -> Result<&SchemaFamily<T>> {
        self.registry.family(major, minor)
    }
}

impl<T: Record> Context<T> {
    /// Opens a decoder over `reader`, consuming the version header.
    ///
    /// # Errors
    ///
    /// See [`Decoder::new`].
    pub fn decoder<R: Read>(&self, reader: R) -> Result<Decoder<'_, T, R>> {
        Decoder::new(self, reader)
    }

    /// Opens an encoder for version `major.minor` over `writer`, writing the header.
    ///
    /// # Errors
    ///
    /// See [`Encoder::new`].
    pub fn encoder<W: Write>(
        &self,
        writer: W,
        major: &str,
        minor: char,
    ) -> Result<Encoder<'_, T, W>> {
        Encoder::new(self, writer, major, minor)
    }
}

/// Builder for [`Context`].
///
/// Delimiters default to `0x01` (field), `0x02` (item), `0x03` (key-value) and `'\n'`
/// (line), and the charset to UTF-8. Nothing is validated until
/// [`ContextBuilder::build`].
#[derive(Debug)]
pub struct ContextBuilder<T> {
    delimiters: Delimiters,
    transcodes: Vec<(char, char)>,
    charset: &'static Encoding,
    schemas: Vec<Schema<T>>,
}

impl<T> Default for ContextBuilder<T> {
    fn default() -> Self {
        ContextBuilder {
            delimiters: Delimiters::default(),
            transcodes: Vec::new(),
            charset: encoding_rs::UTF_8,
            schemas: Vec::new(),
        }
    }
}

impl<T> ContextBuilder<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field_delimiter(mut self, delimiter: char) -> Self {
        self.delimiters.field = delimiter;
        self
    }

    #[must_use]
    pub fn with_item_delimiter(mut self, delimiter: char) -> Self {
        self.delimiters.item = delimiter;
        self
    }

    #[must_use]
    pub fn with_key_value_delimiter(mut self, delimiter: char) -> Self {
        self.delimiters.key_value = delimiter;
        self
    }

    #[must_use]
    pub fn with_line_delimiter(mut self, delimiter: char) -> Self {
        self.delimiters.line = delimiter;
        self
    }

    #[must_use]
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Writes `to` in place of `from` inside values, and reads it back as `from`.
    #[must_use]
    pub fn with_transcoding(mut self, from: char, to: char) -> Self {
        self.transcodes.push((from, to));
        self
    }

    /// Sets the byte encoding of streams. Decoders accept any charset; encoders need
    /// one that can be written, which excludes UTF-16 and `replacement`.
    #[must_use]
    pub fn with_charset(mut self, charset: &'static Encoding) -> Self {
        self.charset = charset;
        self
    }

    /// Sets the charset by its WHATWG label, such as `"utf-8"`, `"gbk"` or `"latin1"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an unknown label.
    pub fn with_charset_label(self, label: &str) -> Result<Self> {
        match Encoding::for_label(label.as_bytes()) {
            Some(charset) => Ok(self.with_charset(charset)),
            None => Err(Error::invalid_config(format!("unknown charset '{}'", label))),
        }
    }

    #[must_use]
    pub fn with_schema(mut self, schema: Schema<T>) -> Self {
        self.schemas.push(schema);
        self
    }

    #[must_use]
    pub fn with_schemas<I>(mut self, schemas: I) -> Self
    where
        I: IntoIterator<Item = Schema<T>>,
    {
        self.schemas.extend(schemas);
        self
    }

    /// Validates the configuration and builds the context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`](crate::Error::InvalidConfig) if two delimiters
    /// are equal, a transcoding substitute is a delimiter or is shared by two characters,
    /// or a `(version, variant)` is registered twice.
    pub fn build(self) -> Result<Context<T>> {
        self.delimiters.validate()?;
        let transcoder = Transcoder::new(&self.delimiters, self.transcodes)?;

        let mut registry = Registry::new();
        for schema in self.schemas {
            log::debug!("registering schema {}", schema.full_version());
            registry.register(schema)?;
        }

        Ok(Context {
            delimiters: self.delimiters,
            transcoder,
            charset: self.charset,
            registry,
        })
    }
}

impl ContextBuilder<DynamicRecord> {
    /// Adds the schema described by `definition`.
    ///
    /// # Errors
    ///
    /// Returns the definition's conversion error.
    pub fn with_definition(self, definition: SchemaDefinition) -> Result<Self> {
        Ok(self.with_schema(definition.into_schema()?))
    }

    /// Adds a schema described as JSON (see [`SchemaDefinition`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`](crate::Error::InvalidConfig) for malformed JSON
    /// or an invalid definition.
    pub fn with_json_schema(self, json: &str) -> Result<Self> {
        self.with_definition(SchemaDefinition::from_json(json)?)
    }
}
