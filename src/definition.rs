//! Schemas described as data rather than code.
//!
//! A [`SchemaDefinition`] deserializes from JSON (or anything serde can read) and turns
//! into a [`Schema<DynamicRecord>`]:
//!
//! ```json
//! {
//!   "majorVersion": "03",
//!   "minorVersion": "0",
//!   "variant": "0",
//!   "fields": [
//!     { "name": "s", "type": "STRING" },
//!     { "name": "arr", "type": "list" }
//!   ]
//! }
//! ```
//!
//! Type names are case-insensitive and accept `int`, `bool` and `array` as aliases.
//! Numeric versions are accepted too: a major version of `3` becomes `"03"`.
//! `variantNumber` is an alias of `variant`.

use crate::{DynamicRecord, Error, FieldType, Result, Schema};
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One field of a [`SchemaDefinition`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// A schema for [`DynamicRecord`]s, in serializable form.
///
/// ```rust
/// use bsv_codec::SchemaDefinition;
///
/// let definition = SchemaDefinition::from_json(
///     r#"{"majorVersion": 3, "minorVersion": 0, "variantNumber": "1",
///         "fields": [{"name": "count", "type": "int"}]}"#,
/// )
/// .unwrap();
/// assert_eq!(definition.major_version, "03");
///
/// let schema = definition.into_schema().unwrap();
/// assert_eq!(schema.full_version(), "03.0.1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDefinition {
    #[serde(deserialize_with = "major_version")]
    pub major_version: String,
    #[serde(deserialize_with = "version_char")]
    pub minor_version: char,
    #[serde(alias = "variantNumber", deserialize_with = "version_char")]
    pub variant: char,
    pub fields: Vec<FieldDefinition>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Component {
    Number(u64),
    Text(String),
}

fn major_version<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Component::deserialize(deserializer)? {
        Component::Number(n) => Ok(format!("{:02}", n)),
        Component::Text(s) => Ok(s),
    }
}

fn version_char<'de, D>(deserializer: D) -> std::result::Result<char, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Component::deserialize(deserializer)? {
        Component::Number(n) => n.to_string(),
        Component::Text(s) => s,
    };
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(serde::de::Error::custom(format!(
            "expected a single character, found {:?}",
            text
        ))),
    }
}

impl SchemaDefinition {
    /// Parses a definition from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for malformed JSON or unknown type names.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::invalid_config(format!("invalid schema definition: {}", e)))
    }

    /// Parses a definition from a JSON reader, such as a schema file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for malformed JSON or unknown type names, and
    /// [`Error::Io`] if the reader fails.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                Error::from(std::io::Error::from(e))
            } else {
                Error::invalid_config(format!("invalid schema definition: {}", e))
            }
        })
    }

    /// Builds the schema, binding each field to the [`DynamicRecord`] entry of the same
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the schema itself is invalid (see
    /// [`SchemaBuilder::build`](crate::SchemaBuilder::build)).
    pub fn into_schema(self) -> Result<Schema<DynamicRecord>> {
        let builder =
            DynamicRecord::schema_builder(&self.major_version, self.minor_version, self.variant);
        self.fields
            .iter()
            .fold(builder, |builder, field| {
                builder.dynamic_field(&field.name, field.field_type)
            })
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_versions() {
        let definition = SchemaDefinition::from_json(
            r#"{
                "majorVersion": "03",
                "minorVersion": "0",
                "variant": "0",
                "fields": [
                    {"name": "s", "type": "STRING"},
                    {"name": "b", "type": "bool"},
                    {"name": "arr", "type": "Array"},
                    {"name": "m", "type": "map"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(definition.major_version, "03");
        assert_eq!(definition.fields[1].field_type, FieldType::Boolean);
        assert_eq!(definition.fields[2].field_type, FieldType::List);

        let schema = definition.into_schema().unwrap();
        let names: Vec<_> = schema.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["s", "b", "arr", "m"]);
    }

    #[test]
    fn test_numeric_versions() {
        let definition = SchemaDefinition::from_json(
            r#"{"majorVersion": 12, "minorVersion": 3, "variantNumber": 4,
                "fields": [{"name": "x", "type": "double"}]}"#,
        )
        .unwrap();
        assert_eq!(definition.major_version, "12");
        assert_eq!(definition.minor_version, '3');
        assert_eq!(definition.variant, '4');
    }

    #[test]
    fn test_rejects_unknown_type() {
        let err = SchemaDefinition::from_json(
            r#"{"majorVersion": "03", "minorVersion": "0", "variant": "0",
                "fields": [{"name": "x", "type": "decimal"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_multi_char_minor() {
        let result = SchemaDefinition::from_json(
            r#"{"majorVersion": "03", "minorVersion": "10", "variant": "0", "fields": []}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_schema_surfaces_on_conversion() {
        let definition = SchemaDefinition::from_json(
            r#"{"majorVersion": "003", "minorVersion": "0", "variant": "0",
                "fields": [{"name": "x", "type": "long"}]}"#,
        )
        .unwrap();
        assert!(definition.into_schema().is_err());
    }

    #[test]
    fn test_from_reader() {
        let json = br#"{"majorVersion": "03", "minorVersion": "0", "variant": "1",
                        "fields": [{"name": "n", "type": "INTEGER"}]}"#;
        let definition = SchemaDefinition::from_reader(&json[..]).unwrap();
        assert_eq!(definition.variant, '1');
    }
}
