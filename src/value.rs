//! Typed field values.
//!
//! - [`FieldType`]: the eight types a schema field can declare
//! - [`FieldValue`]: a value exchanged between the codec and a record's accessors
//! - [`StringMap`]: the map type used for `MAP` fields
//!
//! ## Converting to and from Rust types
//!
//! `From` conversions build a [`FieldValue`] from plain Rust values and `TryFrom`
//! conversions extract them again. A failed extraction is a binding error, which is how
//! record setters reject values they cannot hold.
//!
//! ```rust
//! use bsv_codec::FieldValue;
//! use std::convert::TryFrom;
//!
//! let value = FieldValue::from(42i32);
//! assert_eq!(i32::try_from(value.clone()).unwrap(), 42);
//! assert!(String::try_from(value).is_err());
//!
//! // Absent numbers decode to Null, which only binds to an Option
//! assert_eq!(Option::<i32>::try_from(FieldValue::Null).unwrap(), None);
//! assert!(i32::try_from(FieldValue::Null).is_err());
//! ```

use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// String keys to string values, as carried by `MAP` fields.
///
/// Equality ignores insertion order; encoding writes entries in insertion order.
pub type StringMap = IndexMap<String, String>;

/// The declared type of a schema field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Boolean,
    Integer,
    Long,
    Float,
    Double,
    List,
    Map,
}

impl FieldType {
    pub const ALL: [FieldType; 8] = [
        FieldType::String,
        FieldType::Boolean,
        FieldType::Integer,
        FieldType::Long,
        FieldType::Float,
        FieldType::Double,
        FieldType::List,
        FieldType::Map,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "STRING",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Integer => "INTEGER",
            FieldType::Long => "LONG",
            FieldType::Float => "FLOAT",
            FieldType::Double => "DOUBLE",
            FieldType::List => "LIST",
            FieldType::Map => "MAP",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a type name case-insensitively. `int`, `bool` and `array` are accepted as
/// aliases of `INTEGER`, `BOOLEAN` and `LIST`.
///
/// ```rust
/// use bsv_codec::FieldType;
///
/// assert_eq!("string".parse::<FieldType>().unwrap(), FieldType::String);
/// assert_eq!("Int".parse::<FieldType>().unwrap(), FieldType::Integer);
/// assert_eq!("array".parse::<FieldType>().unwrap(), FieldType::List);
/// assert!("decimal".parse::<FieldType>().is_err());
/// ```
impl FromStr for FieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(field_type) = FieldType::ALL
            .iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
        {
            return Ok(*field_type);
        }
        match s.to_ascii_lowercase().as_str() {
            "int" => Ok(FieldType::Integer),
            "bool" => Ok(FieldType::Boolean),
            "array" => Ok(FieldType::List),
            _ => Err(Error::invalid_config(format!("unknown field type '{}'", s))),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// A single field value.
///
/// `Null` stands for "no value": the decoder produces it for empty numeric tokens, and
/// the encoder writes the declared type's default for it.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    String(String),
    Bool(bool),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    List(Vec<String>),
    Map(StringMap),
}

impl FieldValue {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// The field type this value naturally belongs to, or `None` for `Null`.
    #[must_use]
    pub const fn field_type(&self) -> Option<FieldType> {
        match self {
            FieldValue::Null => None,
            FieldValue::String(_) => Some(FieldType::String),
            FieldValue::Bool(_) => Some(FieldType::Boolean),
            FieldValue::Integer(_) => Some(FieldType::Integer),
            FieldValue::Long(_) => Some(FieldType::Long),
            FieldValue::Float(_) => Some(FieldType::Float),
            FieldValue::Double(_) => Some(FieldType::Double),
            FieldValue::List(_) => Some(FieldType::List),
            FieldValue::Map(_) => Some(FieldType::Map),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns integral values (`Integer` or `Long`) as `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(i64::from(*i)),
            FieldValue::Long(l) => Some(*l),
            _ => None,
        }
    }

    /// Returns floating values (`Float` or `Double`) as `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(f64::from(*f)),
            FieldValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&StringMap> {
        match self {
            FieldValue::Map(map) => Some(map),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        self.field_type().map_or("NULL", FieldType::as_str)
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::String(s) => serializer.serialize_str(s),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Integer(i) => serializer.serialize_i32(*i),
            FieldValue::Long(l) => serializer.serialize_i64(*l),
            FieldValue::Float(f) => serializer.serialize_f32(*f),
            FieldValue::Double(d) => serializer.serialize_f64(*d),
            FieldValue::List(items) => items.serialize(serializer),
            FieldValue::Map(map) => map.serialize(serializer),
        }
    }
}

fn mismatch(expected: &str, found: &FieldValue) -> Error {
    Error::binding("", format!("expected {}, found {}", expected, found.kind()))
}

macro_rules! impl_conversions {
    ($ty:ty, $expected:literal, $variant:ident $(, $widen:ident => $cast:expr)?) => {
        impl From<$ty> for FieldValue {
            fn from(value: $ty) -> Self {
                FieldValue::$variant(value)
            }
        }

        impl From<Option<$ty>> for FieldValue {
            fn from(value: Option<$ty>) -> Self {
                value.map_or(FieldValue::Null, FieldValue::$variant)
            }
        }

        impl TryFrom<FieldValue> for $ty {
            type Error = Error;

            fn try_from(value: FieldValue) -> Result<Self> {
                match value {
                    FieldValue::$variant(v) => Ok(v),
                    $(FieldValue::$widen(v) => Ok($cast(v)),)?
                    other => Err(mismatch($expected, &other)),
                }
            }
        }

        impl TryFrom<FieldValue> for Option<$ty> {
            type Error = Error;

            fn try_from(value: FieldValue) -> Result<Self> {
                match value {
                    FieldValue::Null => Ok(None),
                    other => <$ty>::try_from(other).map(Some),
                }
            }
        }
    };
}

impl_conversions!(String, "STRING", String);
impl_conversions!(bool, "BOOLEAN", Bool);
impl_conversions!(i32, "INTEGER", Integer);
impl_conversions!(i64, "LONG", Long, Integer => i64::from);
impl_conversions!(f32, "FLOAT", Float);
impl_conversions!(f64, "DOUBLE", Double, Float => f64::from);
impl_conversions!(Vec<String>, "LIST", List);
impl_conversions!(StringMap, "MAP", Map);

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<HashMap<String, String>> for FieldValue {
    fn from(value: HashMap<String, String>) -> Self {
        FieldValue::Map(value.into_iter().collect())
    }
}

impl TryFrom<FieldValue> for HashMap<String, String> {
    type Error = Error;

    fn try_from(value: FieldValue) -> Result<Self> {
        StringMap::try_from(value).map(|map| map.into_iter().collect())
    }
}
