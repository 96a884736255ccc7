//! Schema lookup by version.
//!
//! The [`Registry`] groups schemas into [`SchemaFamily`]s keyed by `MM.n`; a family maps
//! a variant character to its schema. A stream selects one family for its whole
//! lifetime and then resolves each line's variant within it.

use crate::schema::family_key;
use crate::{Error, Result, Schema};
use std::collections::HashMap;

/// All schemas sharing one major.minor version, keyed by variant.
#[derive(Debug)]
pub struct SchemaFamily<T> {
    major: String,
    minor: char,
    variants: HashMap<char, Schema<T>>,
}

impl<T> SchemaFamily<T> {
    fn new(major: &str, minor: char) -> Self {
        SchemaFamily {
            major: major.to_string(),
            minor,
            variants: HashMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn major_version(&self) -> &str {
        &self.major
    }

    #[inline]
    #[must_use]
    pub fn minor_version(&self) -> char {
        self.minor
    }

    /// The schema for `variant`, if one is registered.
    #[inline]
    #[must_use]
    pub fn get(&self, variant: char) -> Option<&Schema<T>> {
        self.variants.get(&variant)
    }

    /// Like [`SchemaFamily::get`], failing with [`Error::SchemaResolution`].
    ///
    /// # Errors
    ///
    /// Returns an error when no schema is registered for `variant`.
    pub fn resolve(&self, variant: char) -> Result<&Schema<T>> {
        self.get(variant).ok_or_else(|| {
            Error::schema_resolution(format!(
                "no schema defined for variant {:?} of version {}",
                variant,
                family_key(&self.major, self.minor)
            ))
        })
    }

    /// The registered variants, in no particular order.
    pub fn variants(&self) -> impl Iterator<Item = char> + '_ {
        self.variants.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Schemas keyed by `(major.minor, variant)`.
#[derive(Debug)]
pub struct Registry<T> {
    families: HashMap<String, SchemaFamily<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Registry {
            families: HashMap::new(),
        }
    }
}

impl<T> Registry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a schema with the same full version is
    /// already registered.
    pub fn register(&mut self, schema: Schema<T>) -> Result<()> {
        let family = self
            .families
            .entry(family_key(schema.major_version(), schema.minor_version()))
            .or_insert_with(|| SchemaFamily::new(schema.major_version(), schema.minor_version()));

        if family.variants.contains_key(&schema.variant()) {
            return Err(Error::invalid_config(format!(
                "schema {} is registered twice",
                schema.full_version()
            )));
        }
        family.variants.insert(schema.variant(), schema);
        Ok(())
    }

    /// The family for `major.minor`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaResolution`] if no schema was registered for that version.
    pub fn family(&self, major: &str, minor: char) -> Result<&SchemaFamily<T>> {
        let key = family_key(major, minor);
        self.families.get(&key).ok_or_else(|| {
            Error::schema_resolution(format!("no schemas defined for version {}", key))
        })
    }

    /// Looks up a schema by `(major, minor, variant)`.
    #[must_use]
    pub fn get(&self, major: &str, minor: char, variant: char) -> Option<&Schema<T>> {
        self.families
            .get(&family_key(major, minor))
            .and_then(|family| family.get(variant))
    }

    /// Total number of schemas across all families.
    #[must_use]
    pub fn len(&self) -> usize {
        self.families.values().map(SchemaFamily::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}
