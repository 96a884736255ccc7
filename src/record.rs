//! A name-keyed record type for schemas that are only known at runtime.
//!
//! [`DynamicRecord`] stores one [`FieldValue`] per field name, in schema order. It is the
//! record type that [`SchemaDefinition`](crate::SchemaDefinition) binds to, and it
//! serializes with serde as a `{ "version": ..., "fields": { ... } }` object.
//!
//! ```rust
//! use bsv_codec::{DynamicRecord, FieldType, FieldValue, Record};
//!
//! let schema = DynamicRecord::schema_builder("03", '0', '0')
//!     .dynamic_field("s", FieldType::String)
//!     .dynamic_field("i", FieldType::Integer)
//!     .build()
//!     .unwrap();
//!
//! let mut record = schema.new_record();
//! assert_eq!(record.version(), "03.0.0");
//!
//! schema.field("i").unwrap().set(&mut record, FieldValue::Integer(42)).unwrap();
//! assert_eq!(record.get("i"), Some(&FieldValue::Integer(42)));
//! assert!(schema.field("s").unwrap().set(&mut record, FieldValue::Bool(true)).is_err());
//! ```

use crate::{Error, FieldType, FieldValue, Record, Schema, SchemaBuilder};
use indexmap::IndexMap;
use serde::Serialize;

/// A record whose fields are addressed by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DynamicRecord {
    version: String,
    fields: IndexMap<String, FieldValue>,
}

impl DynamicRecord {
    /// Creates an empty record with no version.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty record tagged with `version` (`"MM.n.v"`).
    #[must_use]
    pub fn with_version(version: &str) -> Self {
        DynamicRecord {
            version: version.to_string(),
            fields: IndexMap::new(),
        }
    }

    /// Starts a schema whose records are `DynamicRecord`s.
    pub fn schema_builder(
        major: &str,
        minor: char,
        variant: char,
    ) -> SchemaBuilder<DynamicRecord> {
        Schema::builder(major, minor, variant, DynamicRecord::new)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Sets a field, returning the previous value.
    pub fn insert<V: Into<FieldValue>>(&mut self, name: &str, value: V) -> Option<FieldValue> {
        self.fields.insert(name.to_string(), value.into())
    }

    /// Builder-style [`DynamicRecord::insert`].
    #[must_use]
    pub fn with<V: Into<FieldValue>>(mut self, name: &str, value: V) -> Self {
        self.insert(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.shift_remove(name)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, FieldValue> {
        self.fields.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Record for DynamicRecord {
    fn version(&self) -> &str {
        &self.version
    }

    fn set_version(&mut self, version: &str) {
        self.version = version.to_string();
    }
}

impl SchemaBuilder<DynamicRecord> {
    /// Appends a field bound to the record entry of the same name.
    ///
    /// The setter accepts `Null` and values of the declared type; anything else is a
    /// binding error. Missing entries read back as `Null`.
    #[must_use]
    pub fn dynamic_field(self, name: &str, field_type: FieldType) -> Self {
        let get_name = name.to_string();
        let set_name = name.to_string();
        self.field(
            name,
            field_type,
            move |record: &DynamicRecord| record.get(&get_name).cloned().unwrap_or_default(),
            move |record: &mut DynamicRecord, value: FieldValue| {
                match value.field_type() {
                    Some(actual) if actual != field_type => Err(Error::binding(
                        &set_name,
                        format!("expected {}, found {}", field_type, actual),
                    )),
                    _ => {
                        record.fields.insert(set_name.clone(), value);
                        Ok(())
                    }
                }
            },
        )
    }
}
