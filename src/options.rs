//! Structural delimiters of the BSV wire format.
//!
//! - [`Delimiters`]: the four structural characters (field, item, key-value, line)
//! - [`Terminator`]: which of them (or end-of-stream) closed a token
//!
//! ## Examples
//!
//! ```rust
//! use bsv_codec::{Delimiters, Terminator};
//!
//! let delimiters = Delimiters::default();
//! assert_eq!(delimiters.field, '\u{1}');
//! assert_eq!(delimiters.line, '\n');
//!
//! let tabbed = Delimiters::new().with_field('\t');
//! assert_eq!(tabbed.classify('\t'), Some(Terminator::Field));
//! assert_eq!(tabbed.classify('x'), None);
//! ```

use crate::{Error, Result};
use std::fmt;

/// Default field delimiter (`0x01`).
pub const DEFAULT_FIELD_DELIMITER: char = '\u{1}';
/// Default item delimiter (`0x02`).
pub const DEFAULT_ITEM_DELIMITER: char = '\u{2}';
/// Default key-value delimiter (`0x03`).
pub const DEFAULT_KEY_VALUE_DELIMITER: char = '\u{3}';
/// Default line delimiter.
pub const DEFAULT_LINE_DELIMITER: char = '\n';

/// What closed a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terminator {
    Field,
    Item,
    KeyValue,
    Line,
    Eof,
}

impl Terminator {
    /// Returns `true` if this terminator ends a line (line delimiter or end-of-stream).
    #[inline]
    #[must_use]
    pub const fn ends_line(self) -> bool {
        matches!(self, Terminator::Line | Terminator::Eof)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Terminator::Field => "field delimiter",
            Terminator::Item => "item delimiter",
            Terminator::KeyValue => "key-value delimiter",
            Terminator::Line => "line delimiter",
            Terminator::Eof => "end of stream",
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four structural characters of a BSV stream.
///
/// They must be pairwise distinct; [`Delimiters::validate`] checks this and
/// [`ContextBuilder::build`](crate::ContextBuilder::build) calls it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delimiters {
    pub field: char,
    pub item: char,
    pub key_value: char,
    pub line: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Delimiters {
            field: DEFAULT_FIELD_DELIMITER,
            item: DEFAULT_ITEM_DELIMITER,
            key_value: DEFAULT_KEY_VALUE_DELIMITER,
            line: DEFAULT_LINE_DELIMITER,
        }
    }
}

impl Delimiters {
    /// Creates the default delimiters (`0x01`, `0x02`, `0x03`, `'\n'`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, delimiter: char) -> Self {
        self.field = delimiter;
        self
    }

    #[must_use]
    pub fn with_item(mut self, delimiter: char) -> Self {
        self.item = delimiter;
        self
    }

    #[must_use]
    pub fn with_key_value(mut self, delimiter: char) -> Self {
        self.key_value = delimiter;
        self
    }

    #[must_use]
    pub fn with_line(mut self, delimiter: char) -> Self {
        self.line = delimiter;
        self
    }

    /// Maps a character to the terminator it represents, if it is structural.
    #[inline]
    #[must_use]
    pub fn classify(&self, ch: char) -> Option<Terminator> {
        if ch == self.field {
            Some(Terminator::Field)
        } else if ch == self.item {
            Some(Terminator::Item)
        } else if ch == self.key_value {
            Some(Terminator::KeyValue)
        } else if ch == self.line {
            Some(Terminator::Line)
        } else {
            None
        }
    }

    /// Returns `true` if `ch` is one of the four structural characters.
    #[inline]
    #[must_use]
    pub fn is_structural(&self, ch: char) -> bool {
        self.classify(ch).is_some()
    }

    /// The character written for a terminator. `Eof` has no character.
    #[must_use]
    pub fn char_for(&self, terminator: Terminator) -> Option<char> {
        match terminator {
            Terminator::Field => Some(self.field),
            Terminator::Item => Some(self.item),
            Terminator::KeyValue => Some(self.key_value),
            Terminator::Line => Some(self.line),
            Terminator::Eof => None,
        }
    }

    /// Checks that the four delimiters are pairwise distinct.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first colliding pair.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("field", self.field),
            ("item", self.item),
            ("key-value", self.key_value),
            ("line", self.line),
        ];
        for (i, (left_name, left)) in named.iter().enumerate() {
            for (right_name, right) in &named[i + 1..] {
                if left == right {
                    return Err(Error::invalid_config(format!(
                        "{} and {} delimiters are both {:?}",
                        left_name, right_name, left
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let d = Delimiters::default();
        assert_eq!(d.field, '\u{1}');
        assert_eq!(d.item, '\u{2}');
        assert_eq!(d.key_value, '\u{3}');
        assert_eq!(d.line, '\n');
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_classify() {
        let d = Delimiters::new().with_field('|').with_item(',').with_key_value('=');
        assert_eq!(d.classify('|'), Some(Terminator::Field));
        assert_eq!(d.classify(','), Some(Terminator::Item));
        assert_eq!(d.classify('='), Some(Terminator::KeyValue));
        assert_eq!(d.classify('\n'), Some(Terminator::Line));
        assert_eq!(d.classify('a'), None);
        assert_eq!(d.char_for(Terminator::Eof), None);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let d = Delimiters::new().with_item('\u{1}');
        let err = d.validate().unwrap_err();
        assert!(err.to_string().contains("field and item"));
    }

    #[test]
    fn test_ends_line() {
        assert!(Terminator::Line.ends_line());
        assert!(Terminator::Eof.ends_line());
        assert!(!Terminator::Field.ends_line());
    }
}
