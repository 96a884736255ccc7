//! Character transcoding used to escape delimiter-colliding characters inside values.
//!
//! A [`Transcoder`] holds the forward (encode) substitution table and its inverse
//! (decode) table. Both are built once, from the forward table, and validated so that
//! every substitute is safe to put on the wire and maps back to exactly one original.
//!
//! ```rust
//! use bsv_codec::{Delimiters, Transcoder};
//!
//! let transcoder = Transcoder::new(&Delimiters::default(), [('\n', '\u{1e}')]).unwrap();
//! assert_eq!(transcoder.encode_char('\n'), '\u{1e}');
//! assert_eq!(transcoder.decode_char('\u{1e}'), '\n');
//! assert_eq!(transcoder.encode_char('a'), 'a');
//! ```

use crate::{Delimiters, Error, Result};
use std::collections::HashMap;

/// Forward and inverse character substitution tables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcoder {
    encode: HashMap<char, char>,
    decode: HashMap<char, char>,
}

impl Transcoder {
    /// Builds both tables from `(original, substitute)` pairs.
    ///
    /// A later pair for the same original replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a substitute is a structural delimiter, or if
    /// two originals share a substitute.
    pub fn new<I>(delimiters: &Delimiters, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (char, char)>,
    {
        let mut encode = HashMap::new();
        for (from, to) in pairs {
            encode.insert(from, to);
        }

        let mut decode = HashMap::with_capacity(encode.len());
        for (&from, &to) in &encode {
            if delimiters.is_structural(to) {
                return Err(Error::invalid_config(format!(
                    "transcoding {:?} -> {:?} substitutes a structural delimiter",
                    from, to
                )));
            }
            if let Some(previous) = decode.insert(to, from) {
                return Err(Error::invalid_config(format!(
                    "transcoding substitute {:?} is shared by {:?} and {:?}",
                    to, previous, from
                )));
            }
        }

        Ok(Transcoder { encode, decode })
    }

    /// The character written in place of `ch`.
    #[inline]
    #[must_use]
    pub fn encode_char(&self, ch: char) -> char {
        self.encode.get(&ch).copied().unwrap_or(ch)
    }

    /// The original character for a substitute read from the wire.
    #[inline]
    #[must_use]
    pub fn decode_char(&self, ch: char) -> char {
        self.decode.get(&ch).copied().unwrap_or(ch)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.encode.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.encode.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_is_derived() {
        let t = Transcoder::new(&Delimiters::default(), [('\n', '\u{1e}'), ('\u{1}', '\u{1f}')])
            .unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.decode_char('\u{1f}'), '\u{1}');
        assert_eq!(t.decode_char('\u{1e}'), '\n');
        assert_eq!(t.decode_char('z'), 'z');
    }

    #[test]
    fn test_rejects_structural_substitute() {
        let err = Transcoder::new(&Delimiters::default(), [('x', '\n')]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_ambiguous_inverse() {
        let err = Transcoder::new(&Delimiters::default(), [('a', '#'), ('b', '#')]).unwrap_err();
        assert!(err.to_string().contains("shared"));
    }

    #[test]
    fn test_later_pair_wins() {
        let t = Transcoder::new(&Delimiters::default(), [('a', '#'), ('a', '%')]).unwrap();
        assert_eq!(t.encode_char('a'), '%');
        assert_eq!(t.decode_char('#'), '#');
    }
}
