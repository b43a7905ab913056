//! Streaming character decoding.
//!
//! [`CharReader`] pulls fixed-size chunks from a byte source and decodes them with
//! `encoding_rs`, so the tokenizer sees characters without the whole input ever
//! being held in memory.

use crate::{Error, Result};
use encoding_rs::{Decoder, DecoderResult, Encoding};
use std::io::{self, Read};

const CHUNK_SIZE: usize = 8 * 1024;

/// Looks up an encoding by its WHATWG label (`utf-8`, `latin1`, `shift_jis`, ...).
///
/// # Errors
///
/// Returns [`Error::UnknownEncoding`] when the label is not recognised.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::UnknownEncoding(label.to_string()))
}

/// Character source over a byte reader in a declared encoding.
pub struct CharReader<R> {
    inner: R,
    decoder: Decoder,
    encoding: &'static Encoding,
    raw: Box<[u8]>,
    decoded: String,
    position: usize,
    bytes_read: u64,
    finished: bool,
}

impl<R: Read> CharReader<R> {
    pub fn new(inner: R, encoding: &'static Encoding) -> Self {
        CharReader {
            inner,
            decoder: encoding.new_decoder_with_bom_removal(),
            encoding,
            raw: vec![0; CHUNK_SIZE].into_boxed_slice(),
            decoded: String::with_capacity(CHUNK_SIZE),
            position: 0,
            bytes_read: 0,
            finished: false,
        }
    }

    /// UTF-8 source, the common case.
    pub fn utf8(inner: R) -> Self {
        Self::new(inner, encoding_rs::UTF_8)
    }

    /// Returns the next character, decoding another chunk when the current one is
    /// exhausted. `Ok(None)` marks the end of the stream.
    pub fn next_char(&mut self) -> Result<Option<char>> {
        loop {
            if let Some(ch) = self.decoded[self.position..].chars().next() {
                self.position += ch.len_utf8();
                return Ok(Some(ch));
            }
            if !self.fill()? {
                return Ok(None);
            }
        }
    }

    /// Decodes the next non-empty chunk. Returns false once the source is drained.
    fn fill(&mut self) -> Result<bool> {
        self.decoded.clear();
        self.position = 0;

        while !self.finished {
            let n = loop {
                match self.inner.read(&mut self.raw) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            };
            let last = n == 0;
            let chunk_start = self.bytes_read;
            self.bytes_read += n as u64;

            let mut src = &self.raw[..n];
            loop {
                let needed = self
                    .decoder
                    .max_utf8_buffer_length_without_replacement(src.len())
                    .unwrap_or(src.len() * 3 + 16);
                self.decoded.reserve(needed);

                let (result, read) =
                    self.decoder
                        .decode_to_string_without_replacement(src, &mut self.decoded, last);
                src = &src[read..];
                match result {
                    DecoderResult::InputEmpty => break,
                    DecoderResult::OutputFull => continue,
                    DecoderResult::Malformed(_, _) => {
                        let offset = chunk_start + (n - src.len()) as u64;
                        return Err(Error::encoding(self.encoding.name(), offset));
                    }
                }
            }

            if last {
                self.finished = true;
            }
            if !self.decoded.is_empty() {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn drain<R: Read>(reader: &mut CharReader<R>) -> Result<String> {
        let mut out = String::new();
        while let Some(ch) = reader.next_char()? {
            out.push(ch);
        }
        Ok(out)
    }

    #[test]
    fn test_utf8_passthrough() {
        let mut reader = CharReader::utf8(Cursor::new("héllo, wörld".as_bytes()));
        assert_eq!(drain(&mut reader).unwrap(), "héllo, wörld");
    }

    #[test]
    fn test_bom_removed() {
        let mut reader = CharReader::utf8(Cursor::new(b"\xEF\xBB\xBFid,name".to_vec()));
        assert_eq!(drain(&mut reader).unwrap(), "id,name");
    }

    #[test]
    fn test_latin1_decoding() {
        let encoding = encoding_for_label("latin1").unwrap();
        let mut reader = CharReader::new(Cursor::new(b"caf\xE9".to_vec()), encoding);
        assert_eq!(drain(&mut reader).unwrap(), "café");
    }

    #[test]
    fn test_invalid_utf8_is_encoding_error() {
        let mut reader = CharReader::utf8(Cursor::new(b"ab\xFFcd".to_vec()));
        let err = drain(&mut reader).unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
    }

    #[test]
    fn test_unknown_label() {
        let err = encoding_for_label("klingon").unwrap_err();
        assert_eq!(err, Error::UnknownEncoding("klingon".to_string()));
    }

    #[test]
    fn test_multibyte_across_chunk_boundary() {
        let mut input = "a".repeat(CHUNK_SIZE - 1);
        input.push('é');
        input.push_str("z");
        let mut reader = CharReader::utf8(Cursor::new(input.clone().into_bytes()));
        assert_eq!(drain(&mut reader).unwrap(), input);
    }
}
