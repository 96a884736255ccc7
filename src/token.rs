//! The character-level tokenizer shared by the decoder and the encoder.
//!
//! [`TokenReader`] splits a byte stream into tokens closed by one of the four structural
//! delimiters (or end-of-stream), undoing transcoding as it goes. [`TokenWriter`] writes
//! values with transcoding applied and delimiters verbatim. Neither validates structure;
//! that is the field codec's job.
//!
//! Bytes are converted with the stream's charset through `encoding_rs`. Delimiters and
//! transcoding work on decoded characters, so they are independent of the byte encoding.

use crate::{Delimiters, Error, Result, Terminator, Transcoder};
use encoding_rs::{EncoderResult, Encoding};
use std::io::{self, BufRead, BufWriter, Write};

const INITIAL_TOKEN_CAPACITY: usize = 512;

fn buffer_overflow() -> Error {
    io::Error::new(io::ErrorKind::InvalidData, "charset buffer length overflow").into()
}

/// Reads tokens from a buffered byte source.
pub struct TokenReader<'c, R> {
    inner: R,
    decoder: encoding_rs::Decoder,
    decoded: String,
    pos: usize,
    finished: bool,
    delimiters: Delimiters,
    transcoder: &'c Transcoder,
    token: String,
    line: usize,
    at_line_start: bool,
}

impl<'c, R: BufRead> TokenReader<'c, R> {
    pub fn new(
        inner: R,
        charset: &'static Encoding,
        delimiters: Delimiters,
        transcoder: &'c Transcoder,
    ) -> Self {
        TokenReader {
            inner,
            decoder: charset.new_decoder_without_bom_handling(),
            decoded: String::new(),
            pos: 0,
            finished: false,
            delimiters,
            transcoder,
            token: String::with_capacity(INITIAL_TOKEN_CAPACITY),
            line: 1,
            at_line_start: true,
        }
    }

    /// The text of the last token read by [`TokenReader::next_token`].
    #[inline]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Takes the last token's text, leaving the buffer empty.
    #[inline]
    pub fn take_token(&mut self) -> String {
        std::mem::take(&mut self.token)
    }

    /// 1-based number of the line being read.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// `true` when the last character consumed was a line delimiter (or nothing has
    /// been read yet), i.e. the stream head sits on a line boundary.
    #[inline]
    pub fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    /// Releases the source. Bytes already decoded but not yet read are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Decodes the next chunk of the source into `decoded`. Returns `false` once the
    /// source is exhausted and nothing is left to read.
    fn fill_decoded(&mut self) -> Result<bool> {
        self.decoded.clear();
        self.pos = 0;
        while !self.finished {
            let src = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            let last = src.is_empty();
            let needed = self
                .decoder
                .max_utf8_buffer_length(src.len())
                .ok_or_else(buffer_overflow)?;
            self.decoded.reserve(needed);
            // Malformed input becomes U+FFFD; a byte that cannot continue a sequence is
            // decoded on its own, so a following delimiter is still seen
            let (_, read, _) = self.decoder.decode_to_string(src, &mut self.decoded, last);
            self.inner.consume(read);
            self.finished = last;
            if !self.decoded.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Reads one character without any delimiter or transcoding handling.
    pub fn read_char(&mut self) -> Result<Option<char>> {
        if self.pos >= self.decoded.len() && !self.fill_decoded()? {
            return Ok(None);
        }
        let ch = match self.decoded[self.pos..].chars().next() {
            Some(ch) => ch,
            None => return Ok(None),
        };
        self.pos += ch.len_utf8();

        self.at_line_start = ch == self.delimiters.line;
        if self.at_line_start {
            self.line += 1;
        }
        Ok(Some(ch))
    }

    /// Reads the next token into the token buffer and returns what closed it.
    ///
    /// # Errors
    ///
    /// Only I/O failures.
    pub fn next_token(&mut self) -> Result<Terminator> {
        self.token.clear();
        loop {
            let ch = match self.read_char()? {
                Some(ch) => ch,
                None => return Ok(Terminator::Eof),
            };
            if let Some(terminator) = self.delimiters.classify(ch) {
                return Ok(terminator);
            }
            let decoded = self.transcoder.decode_char(ch);
            self.token.push(decoded);
        }
    }

    /// Discards the rest of the current line, including its line delimiter, and returns
    /// the raw text that was dropped. Does nothing when already on a line boundary.
    ///
    /// # Errors
    ///
    /// Only I/O failures.
    pub fn skip_line(&mut self) -> Result<String> {
        let mut discarded = String::new();
        if self.at_line_start {
            return Ok(discarded);
        }
        while let Some(ch) = self.read_char()? {
            if ch == self.delimiters.line {
                break;
            }
            discarded.push(ch);
        }
        Ok(discarded)
    }
}

/// Writes tokens and delimiters to a buffered sink.
pub struct TokenWriter<'c, W: Write> {
    inner: BufWriter<W>,
    charset: &'static Encoding,
    encoder: encoding_rs::Encoder,
    scratch: Vec<u8>,
    delimiters: Delimiters,
    transcoder: &'c Transcoder,
}

impl<'c, W: Write> TokenWriter<'c, W> {
    /// Creates a writer. `charset` must be able to encode, which UTF-16 and
    /// `replacement` cannot (their encoders produce UTF-8).
    pub fn new(
        inner: W,
        charset: &'static Encoding,
        delimiters: Delimiters,
        transcoder: &'c Transcoder,
    ) -> Self {
        TokenWriter {
            inner: BufWriter::new(inner),
            charset,
            encoder: charset.new_encoder(),
            scratch: Vec::new(),
            delimiters,
            transcoder,
        }
    }

    fn encode(&mut self, text: &str, last: bool) -> Result<()> {
        let needed = self
            .encoder
            .max_buffer_length_from_utf8_without_replacement(text.len())
            .ok_or_else(buffer_overflow)?;
        self.scratch.clear();
        self.scratch.reserve(needed);
        let (result, _) =
            self.encoder
                .encode_from_utf8_to_vec_without_replacement(text, &mut self.scratch, last);
        if let EncoderResult::Unmappable(ch) = result {
            return Err(Error::Unmappable {
                field: String::new(),
                ch,
                charset: self.charset.name().to_string(),
            });
        }
        self.inner.write_all(&self.scratch)?;
        Ok(())
    }

    fn write_char(&mut self, ch: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.encode(ch.encode_utf8(&mut buf), false)
    }

    /// Writes value text, transcoding each character.
    ///
    /// # Errors
    ///
    /// Characters before the failing one have been written. With no field name yet:
    ///
    /// - [`Error::UnescapedDelimiter`] if a character is still structural after
    ///   transcoding
    /// - [`Error::ReservedSubstitute`] if a character would read back as a different one,
    ///   because it is another character's substitute
    /// - [`Error::Unmappable`] if the charset cannot encode a character
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        for ch in text.chars() {
            let encoded = self.transcoder.encode_char(ch);
            if self.delimiters.is_structural(encoded) {
                return Err(Error::UnescapedDelimiter {
                    field: String::new(),
                    ch,
                });
            }
            if self.transcoder.decode_char(encoded) != ch {
                return Err(Error::ReservedSubstitute {
                    field: String::new(),
                    ch,
                });
            }
            self.write_char(encoded)?;
        }
        Ok(())
    }

    /// Writes text that never needs transcoding, such as formatted numbers.
    pub fn write_raw(&mut self, text: &str) -> Result<()> {
        self.encode(text, false)
    }

    /// Writes the character of a structural delimiter. `Eof` writes nothing.
    pub fn write_delimiter(&mut self, terminator: Terminator) -> Result<()> {
        match self.delimiters.char_for(terminator) {
            Some(ch) => self.write_char(ch),
            None => Ok(()),
        }
    }

    /// Writes a character as-is (variant selectors, header components).
    pub fn write_verbatim(&mut self, ch: char) -> Result<()> {
        self.write_char(ch)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Ends the encoding, flushes and returns the sink.
    ///
    /// # Errors
    ///
    /// Returns the flush failure.
    pub fn into_inner(mut self) -> Result<W> {
        // stateful charsets such as ISO-2022-JP return to their initial state here
        self.encode("", true)?;
        self.inner.into_inner().map_err(|e| e.into_error().into())
    }

    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{GBK, UTF_8};

    fn reader<'c>(input: &'c [u8], transcoder: &'c Transcoder) -> TokenReader<'c, &'c [u8]> {
        TokenReader::new(input, UTF_8, Delimiters::default(), transcoder)
    }

    fn writer(transcoder: &Transcoder) -> TokenWriter<'_, Vec<u8>> {
        TokenWriter::new(Vec::new(), UTF_8, Delimiters::default(), transcoder)
    }

    #[test]
    fn test_tokens_and_terminators() {
        let t = Transcoder::default();
        let mut r = reader(b"ab\x01c\x02\x03d\n", &t);
        assert_eq!(r.next_token().unwrap(), Terminator::Field);
        assert_eq!(r.token(), "ab");
        assert_eq!(r.next_token().unwrap(), Terminator::Item);
        assert_eq!(r.token(), "c");
        assert_eq!(r.next_token().unwrap(), Terminator::KeyValue);
        assert_eq!(r.token(), "");
        assert_eq!(r.next_token().unwrap(), Terminator::Line);
        assert_eq!(r.token(), "d");
        assert_eq!(r.line(), 2);
        assert_eq!(r.next_token().unwrap(), Terminator::Eof);
    }

    #[test]
    fn test_decode_transcoding() {
        let t = Transcoder::new(&Delimiters::default(), [('\n', '\u{1e}')]).unwrap();
        let mut r = reader("x\u{1e}y".as_bytes(), &t);
        assert_eq!(r.next_token().unwrap(), Terminator::Eof);
        assert_eq!(r.token(), "x\ny");
    }

    #[test]
    fn test_multibyte_characters() {
        let t = Transcoder::default();
        let input = "A币C\u{1}😀\n";
        let mut r = reader(input.as_bytes(), &t);
        assert_eq!(r.next_token().unwrap(), Terminator::Field);
        assert_eq!(r.token(), "A币C");
        assert_eq!(r.next_token().unwrap(), Terminator::Line);
        assert_eq!(r.token(), "😀");
    }

    #[test]
    fn test_malformed_utf8_keeps_delimiter() {
        let t = Transcoder::default();
        // 0xE4 starts a 3-byte sequence that is cut short by the field delimiter
        let mut r = reader(b"a\xE4\x01b", &t);
        assert_eq!(r.next_token().unwrap(), Terminator::Field);
        assert_eq!(r.token(), "a\u{FFFD}");
        assert_eq!(r.next_token().unwrap(), Terminator::Eof);
        assert_eq!(r.token(), "b");
    }

    #[test]
    fn test_truncated_sequence_at_end_of_stream() {
        let t = Transcoder::default();
        let mut r = reader(b"ok\xF0\x9F", &t);
        assert_eq!(r.next_token().unwrap(), Terminator::Eof);
        assert_eq!(r.token(), "ok\u{FFFD}");
        assert_eq!(r.next_token().unwrap(), Terminator::Eof);
    }

    #[test]
    fn test_gbk_reader() {
        let t = Transcoder::default();
        // "币" is 0xB1 0xD2 in GBK
        let input: &[u8] = b"A\xB1\xD2C\x01x\n";
        let mut r = TokenReader::new(input, GBK, Delimiters::default(), &t);
        assert_eq!(r.next_token().unwrap(), Terminator::Field);
        assert_eq!(r.token(), "A币C");
        assert_eq!(r.next_token().unwrap(), Terminator::Line);
        assert_eq!(r.token(), "x");
    }

    #[test]
    fn test_skip_line() {
        let t = Transcoder::default();
        let mut r = reader(b"abc\x01def\nnext", &t);
        r.next_token().unwrap();
        assert!(!r.at_line_start());
        assert_eq!(r.skip_line().unwrap(), "def");
        assert!(r.at_line_start());
        assert_eq!(r.skip_line().unwrap(), "");
        assert_eq!(r.next_token().unwrap(), Terminator::Eof);
        assert_eq!(r.token(), "next");
    }

    #[test]
    fn test_writer() {
        let t = Transcoder::new(&Delimiters::default(), [('\n', '\u{1e}')]).unwrap();
        let mut w = writer(&t);
        w.write_verbatim('0').unwrap();
        w.write_text("a\nb").unwrap();
        w.write_delimiter(Terminator::Field).unwrap();
        w.write_raw("42").unwrap();
        w.write_delimiter(Terminator::Eof).unwrap();
        w.write_delimiter(Terminator::Line).unwrap();
        assert_eq!(w.into_inner().unwrap(), "0a\u{1e}b\u{1}42\n".as_bytes());
    }

    #[test]
    fn test_writer_rejects_unescaped_delimiter() {
        let t = Transcoder::default();
        let mut w = writer(&t);
        let err = w.write_text("a\u{2}b").unwrap_err();
        assert!(matches!(err, Error::UnescapedDelimiter { ch: '\u{2}', .. }));
    }

    #[test]
    fn test_writer_rejects_literal_substitute() {
        let t = Transcoder::new(&Delimiters::default(), [('\n', '\u{1e}')]).unwrap();
        let mut w = writer(&t);
        let err = w.write_text("a\u{1e}b").unwrap_err();
        assert!(matches!(err, Error::ReservedSubstitute { ch: '\u{1e}', .. }));
    }

    #[test]
    fn test_writer_allows_chained_substitutes() {
        // 'a' is both a substitute and an original, so it still reads back as itself
        let t = Transcoder::new(&Delimiters::default(), [('\n', 'a'), ('a', 'b')]).unwrap();
        let mut w = writer(&t);
        w.write_text("a\n").unwrap();
        assert_eq!(w.into_inner().unwrap(), b"ba");
    }

    #[test]
    fn test_gbk_writer() {
        let t = Transcoder::default();
        let mut w = TokenWriter::new(Vec::new(), GBK, Delimiters::default(), &t);
        w.write_text("A币C").unwrap();
        w.write_delimiter(Terminator::Line).unwrap();
        assert_eq!(w.into_inner().unwrap(), b"A\xB1\xD2C\n");

        let mut w = TokenWriter::new(Vec::new(), GBK, Delimiters::default(), &t);
        let err = w.write_text("😀").unwrap_err();
        assert!(matches!(
            err,
            Error::Unmappable { ch: '😀', ref charset, .. } if charset == "GBK"
        ));
    }
}
