//! Schemas: the ordered, typed field layout of one `(major.minor, variant)`.
//!
//! A [`Schema`] is built with [`Schema::builder`]. The version components are fixed up
//! front, then fields are attached in wire order, each with a getter and a setter
//! closure against the record type. The codec never inspects the record type itself.
//!
//! ```rust
//! use bsv_codec::{FieldType, FieldValue, Record, Schema};
//!
//! #[derive(Default)]
//! struct Event {
//!     version: String,
//!     name: String,
//!     count: Option<i64>,
//! }
//!
//! impl Record for Event {
//!     fn version(&self) -> &str {
//!         &self.version
//!     }
//!     fn set_version(&mut self, version: &str) {
//!         self.version = version.to_string();
//!     }
//! }
//!
//! let schema = Schema::builder("07", '1', 'a', Event::default)
//!     .field(
//!         "name",
//!         FieldType::String,
//!         |e: &Event| FieldValue::from(e.name.clone()),
//!         |e: &mut Event, v: FieldValue| {
//!             e.name = v.try_into()?;
//!             Ok(())
//!         },
//!     )
//!     .field(
//!         "count",
//!         FieldType::Long,
//!         |e: &Event| FieldValue::from(e.count),
//!         |e: &mut Event, v: FieldValue| {
//!             e.count = v.try_into()?;
//!             Ok(())
//!         },
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.full_version(), "07.1.a");
//! assert_eq!(schema.fields().len(), 2);
//! ```

use crate::{Error, FieldType, FieldValue, Result};
use std::fmt;

/// A record type the codec can fill and read.
///
/// Records carry the full version (`"MM.n.v"`) of the schema they belong to. The decoder
/// stamps it on every record it creates; the encoder reads it to pick the schema.
pub trait Record {
    fn version(&self) -> &str;

    fn set_version(&mut self, version: &str);
}

/// Reads a field's value from a record.
pub type Getter<T> = Box<dyn Fn(&T) -> FieldValue + Send + Sync>;
/// Stores a decoded value into a record; an error rejects the value.
pub type Setter<T> = Box<dyn Fn(&mut T, FieldValue) -> Result<()> + Send + Sync>;
/// Creates an empty record.
pub type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// A parsed `"MM.n.v"` version.
///
/// ```rust
/// use bsv_codec::Version;
///
/// let version = Version::parse("03.0.1").unwrap();
/// assert_eq!(version.major, "03");
/// assert_eq!(version.minor, '0');
/// assert_eq!(version.variant, '1');
/// assert_eq!(version.family(), "03.0");
/// assert!(Version::parse("3.0.1").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: String,
    pub minor: char,
    pub variant: char,
}

impl Version {
    /// Creates a version, checking that `major` is exactly two characters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a malformed major version.
    pub fn new(major: &str, minor: char, variant: char) -> Result<Self> {
        check_major(major)?;
        Ok(Version {
            major: major.to_string(),
            minor,
            variant,
        })
    }

    /// Parses a full version string of exactly six characters, `MM.n.v`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the string is not of that shape.
    pub fn parse(full: &str) -> Result<Self> {
        let chars: Vec<char> = full.chars().collect();
        match chars.as_slice() {
            [m1, m2, '.', minor, '.', variant] => Ok(Version {
                major: [*m1, *m2].iter().collect(),
                minor: *minor,
                variant: *variant,
            }),
            _ => Err(Error::invalid_config(format!(
                "version '{}' is not of the form MM.n.v",
                full
            ))),
        }
    }

    /// The `MM.n` family key shared by all variants of this version.
    #[must_use]
    pub fn family(&self) -> String {
        family_key(&self.major, self.minor)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.variant)
    }
}

pub(crate) fn family_key(major: &str, minor: char) -> String {
    format!("{}.{}", major, minor)
}

pub(crate) fn check_major(major: &str) -> Result<()> {
    if major.chars().count() == 2 {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "major version must be 2 characters, but is '{}'",
            major
        )))
    }
}

/// One field of a schema.
pub struct Field<T> {
    index: usize,
    name: String,
    field_type: FieldType,
    getter: Getter<T>,
    setter: Setter<T>,
}

impl<T> Field<T> {
    /// Position of the field in the line, starting at 0.
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Reads this field from `record`.
    pub fn get(&self, record: &T) -> FieldValue {
        (self.getter)(record)
    }

    /// Stores `value` into `record`, naming this field in any binding error.
    ///
    /// # Errors
    ///
    /// Returns the setter's error, typically [`Error::Binding`].
    pub fn set(&self, record: &mut T, value: FieldValue) -> Result<()> {
        (self.setter)(record, value).map_err(|e| e.in_field(&self.name))
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .finish()
    }
}

/// The field layout and record bindings of one `(major.minor, variant)`.
pub struct Schema<T> {
    version: Version,
    full_version: String,
    fields: Vec<Field<T>>,
    factory: Factory<T>,
}

impl<T> Schema<T> {
    /// Starts a schema for version `major.minor.variant` whose records come from
    /// `factory`.
    pub fn builder<F>(major: &str, minor: char, variant: char, factory: F) -> SchemaBuilder<T>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        SchemaBuilder {
            major: major.to_string(),
            minor,
            variant,
            fields: Vec::new(),
            factory: Box::new(factory),
        }
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }

    #[inline]
    #[must_use]
    pub fn major_version(&self) -> &str {
        &self.version.major
    }

    #[inline]
    #[must_use]
    pub fn minor_version(&self) -> char {
        self.version.minor
    }

    #[inline]
    #[must_use]
    pub fn variant(&self) -> char {
        self.version.variant
    }

    /// The `"MM.n.v"` version stamped on decoded records.
    #[inline]
    #[must_use]
    pub fn full_version(&self) -> &str {
        &self.full_version
    }

    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field<T>> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl<T: Record> Schema<T> {
    /// Creates an empty record stamped with this schema's full version.
    pub fn new_record(&self) -> T {
        let mut record = (self.factory)();
        record.set_version(&self.full_version);
        record
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("version", &self.full_version)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Builder for [`Schema`]. Created by [`Schema::builder`].
pub struct SchemaBuilder<T> {
    major: String,
    minor: char,
    variant: char,
    fields: Vec<Field<T>>,
    factory: Factory<T>,
}

impl<T> SchemaBuilder<T> {
    /// Appends a field. Fields are written and read in the order they are added.
    #[must_use]
    pub fn field<G, S>(mut self, name: &str, field_type: FieldType, getter: G, setter: S) -> Self
    where
        G: Fn(&T) -> FieldValue + Send + Sync + 'static,
        S: Fn(&mut T, FieldValue) -> Result<()> + Send + Sync + 'static,
    {
        let index = self.fields.len();
        self.fields.push(Field {
            index,
            name: name.to_string(),
            field_type,
            getter: Box::new(getter),
            setter: Box::new(setter),
        });
        self
    }

    /// Finishes the schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the major version is not two characters, the
    /// schema has no fields, or two fields share a name.
    pub fn build(self) -> Result<Schema<T>> {
        let version = Version::new(&self.major, self.minor, self.variant)?;
        if self.fields.is_empty() {
            return Err(Error::invalid_config(format!(
                "schema {} has no fields",
                version
            )));
        }
        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(Error::invalid_config(format!(
                    "schema {} declares field '{}' twice",
                    version, field.name
                )));
            }
        }

        Ok(Schema {
            full_version: version.to_string(),
            version,
            fields: self.fields,
            factory: self.factory,
        })
    }
}
