//! CSV tokenizing.
//!
//! This module provides the [`Tokenizer`], which turns a character stream into a
//! lazy sequence of rows.
//!
//! ## Overview
//!
//! - **Streaming**: one record is materialized at a time, whatever the input size
//! - **Quoting**: quoted fields may hold delimiters, line breaks and doubled quotes
//! - **Line terminators**: `\n`, `\r\n` and a lone `\r` all end a record
//! - **Error reporting**: malformed quoting is reported with line/column information
//!
//! ## Usage
//!
//! ```rust
//! use csv_width::{Dialect, Tokenizer};
//!
//! let mut tokenizer = Tokenizer::from_str("a,\"b,c\"\n1,2\n", Dialect::new());
//! let rows: Vec<Vec<String>> = tokenizer.by_ref().collect::<Result<_, _>>().unwrap();
//! assert_eq!(rows, vec![vec!["a", "b,c"], vec!["1", "2"]]);
//! ```
//!
//! ## Record Boundaries
//!
//! A file ending with a line terminator does not produce a trailing empty row. A
//! blank line anywhere else is a record with zero fields.
//!
//! ```rust
//! use csv_width::{Dialect, Tokenizer};
//!
//! let rows: Vec<Vec<String>> = Tokenizer::from_str("a\n\nb\n", Dialect::new())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(rows, vec![vec!["a".to_string()], vec![], vec!["b".to_string()]]);
//! ```

use crate::decode::CharReader;
use crate::options::{is_line_break, LineTerminator};
use crate::{Dialect, Error, Result, Row};
use encoding_rs::Encoding;
use std::io::Read;
use std::mem;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    FieldStart,
    Unquoted,
    Quoted,
    QuotedQuoteSeen,
}

/// The CSV tokenizer.
///
/// Implements `Iterator<Item = Result<Row>>`. After the first error the iterator
/// is fused and yields nothing more.
pub struct Tokenizer<R> {
    source: CharReader<R>,
    dialect: Dialect,
    peeked: Option<char>,
    line: usize,
    column: usize,
    detected_terminator: Option<LineTerminator>,
    done: bool,
}

impl<'a> Tokenizer<&'a [u8]> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str, dialect: Dialect) -> Self {
        Tokenizer::new(input.as_bytes(), dialect)
    }
}

impl<R: Read> Tokenizer<R> {
    /// Creates a tokenizer over UTF-8 input.
    pub fn new(reader: R, dialect: Dialect) -> Self {
        Self::from_chars(CharReader::utf8(reader), dialect)
    }

    /// Creates a tokenizer over input in the given encoding.
    pub fn with_encoding(reader: R, dialect: Dialect, encoding: &'static Encoding) -> Self {
        Self::from_chars(CharReader::new(reader, encoding), dialect)
    }

    pub fn from_chars(source: CharReader<R>, dialect: Dialect) -> Self {
        Tokenizer {
            source,
            dialect,
            peeked: None,
            line: 1,
            column: 1,
            detected_terminator: None,
            done: false,
        }
    }

    /// Terminator that ended the first record, if one has been read yet.
    pub fn detected_terminator(&self) -> Option<LineTerminator> {
        self.detected_terminator
    }

    fn peek_char(&mut self) -> Result<Option<char>> {
        if self.peeked.is_none() {
            self.peeked = self.source.next_char()?;
        }
        Ok(self.peeked)
    }

    fn next_char(&mut self) -> Result<Option<char>> {
        let ch = match self.peeked.take() {
            Some(ch) => Some(ch),
            None => self.source.next_char()?,
        };
        match ch {
            // A `\r` directly followed by `\n` is counted once, on the `\n`.
            Some('\r') if self.peek_char()? != Some('\n') => self.new_line(),
            Some('\n') => self.new_line(),
            Some(_) => self.column += 1,
            None => {}
        }
        Ok(ch)
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    /// Consumes the rest of a line terminator starting with `first`.
    fn end_record(&mut self, first: char) -> Result<()> {
        let terminator = if first == '\r' && self.peek_char()? == Some('\n') {
            self.next_char()?;
            LineTerminator::CrLf
        } else {
            LineTerminator::Lf
        };
        if self.detected_terminator.is_none() {
            self.detected_terminator = Some(terminator);
        }
        Ok(())
    }

    fn finish_unquoted(&self, field: String) -> String {
        if self.dialect.trim {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                return trimmed.to_string();
            }
        }
        field
    }

    /// Reads the next logical record. `Ok(None)` marks the end of input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedQuoting`] for an unterminated quoted field or a
    /// character other than delimiter, quote or line terminator after a closing
    /// quote. Decoding and I/O failures of the source are propagated.
    pub fn read_record(&mut self) -> Result<Option<Row>> {
        if self.done {
            return Ok(None);
        }

        let delimiter = self.dialect.delimiter;
        let quote = self.dialect.quote;

        let mut row = Row::new();
        let mut field = String::new();
        let mut state = State::FieldStart;
        let mut quote_opened_at = (self.line, self.column);

        loop {
            let (line, col) = (self.line, self.column);
            let ch = match self.next_char()? {
                Some(ch) => ch,
                None => {
                    self.done = true;
                    match state {
                        // Nothing consumed since the last terminator.
                        State::FieldStart if row.is_empty() => return Ok(None),
                        State::FieldStart | State::QuotedQuoteSeen => row.push(field),
                        State::Unquoted => row.push(self.finish_unquoted(field)),
                        State::Quoted => {
                            let (line, col) = quote_opened_at;
                            return Err(Error::malformed_quoting(
                                line,
                                col,
                                "unterminated quoted field at end of input",
                            ));
                        }
                    }
                    return Ok(Some(row));
                }
            };

            match state {
                State::FieldStart => {
                    if ch == quote {
                        quote_opened_at = (line, col);
                        state = State::Quoted;
                    } else if ch == delimiter {
                        row.push(mem::take(&mut field));
                    } else if is_line_break(ch) {
                        self.end_record(ch)?;
                        // `a,` ends with an empty field, a blank line has none.
                        if !row.is_empty() {
                            row.push(field);
                        }
                        break;
                    } else {
                        field.push(ch);
                        state = State::Unquoted;
                    }
                }
                State::Unquoted => {
                    if ch == delimiter {
                        row.push(self.finish_unquoted(mem::take(&mut field)));
                        state = State::FieldStart;
                    } else if is_line_break(ch) {
                        self.end_record(ch)?;
                        row.push(self.finish_unquoted(field));
                        break;
                    } else {
                        field.push(ch);
                    }
                }
                State::Quoted => {
                    if ch == quote {
                        state = State::QuotedQuoteSeen;
                    } else {
                        field.push(ch);
                    }
                }
                State::QuotedQuoteSeen => {
                    if ch == quote {
                        field.push(quote);
                        state = State::Quoted;
                    } else if ch == delimiter {
                        row.push(mem::take(&mut field));
                        state = State::FieldStart;
                    } else if is_line_break(ch) {
                        self.end_record(ch)?;
                        row.push(field);
                        break;
                    } else {
                        return Err(Error::MalformedQuoting {
                            line,
                            col,
                            msg: format!(
                                "unexpected character {:?} after closing quote",
                                ch
                            ),
                        });
                    }
                }
            }
        }

        Ok(Some(row))
    }
}

impl<R: Read> Iterator for Tokenizer<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_record() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Vec<Row>> {
        Tokenizer::from_str(input, Dialect::new()).collect()
    }

    #[test]
    fn test_simple_records() {
        let rows = parse("id,name\n1,Alice\n").unwrap();
        assert_eq!(rows, vec![row!["id", "name"], row!["1", "Alice"]]);
    }

    #[test]
    fn test_no_trailing_terminator() {
        let rows = parse("a,b\nc,d").unwrap();
        assert_eq!(rows, vec![row!["a", "b"], row!["c", "d"]]);
    }

    #[test]
    fn test_empty_fields() {
        let rows = parse("a,\n,\n,,x\n").unwrap();
        assert_eq!(
            rows,
            vec![row!["a", ""], row!["", ""], row!["", "", "x"]]
        );
    }

    #[test]
    fn test_trailing_delimiter_at_eof() {
        let rows = parse("a,").unwrap();
        assert_eq!(rows, vec![row!["a", ""]]);
    }

    #[test]
    fn test_blank_line_is_zero_field_record() {
        let rows = parse("\na,b\n").unwrap();
        assert_eq!(rows, vec![row![], row!["a", "b"]]);
    }

    #[test]
    fn test_quoted_delimiter_and_doubled_quote() {
        let rows = parse("\"He said \"\"hi\"\", twice\",x\n").unwrap();
        assert_eq!(rows, vec![row!["He said \"hi\", twice", "x"]]);
    }

    #[test]
    fn test_embedded_newline() {
        let rows = parse("a,\"multi\nline\",c\nd,e,f\n").unwrap();
        assert_eq!(rows, vec![row!["a", "multi\nline", "c"], row!["d", "e", "f"]]);
    }

    #[test]
    fn test_empty_quoted_field() {
        let rows = parse("\"\"\n\"\",\"\"\n").unwrap();
        assert_eq!(rows, vec![row![""], row!["", ""]]);
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        let rows = parse("ab\"c,d\n").unwrap();
        assert_eq!(rows, vec![row!["ab\"c", "d"]]);
    }

    #[test]
    fn test_crlf_detection() {
        let mut tokenizer = Tokenizer::from_str("a,b\r\nc,d\r\n", Dialect::new());
        assert_eq!(tokenizer.next().unwrap().unwrap(), row!["a", "b"]);
        assert_eq!(tokenizer.detected_terminator(), Some(LineTerminator::CrLf));
        assert_eq!(tokenizer.next().unwrap().unwrap(), row!["c", "d"]);
        assert!(tokenizer.next().is_none());
    }

    #[test]
    fn test_lone_carriage_return() {
        let mut tokenizer = Tokenizer::from_str("a\rb\r", Dialect::new());
        let rows: Vec<Row> = tokenizer.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(rows, vec![row!["a"], row!["b"]]);
        assert_eq!(tokenizer.detected_terminator(), Some(LineTerminator::Lf));
    }

    #[test]
    fn test_lone_carriage_return_counts_lines() {
        let err = parse("a\rb\r\"open").unwrap_err();
        assert_eq!(
            err,
            Error::malformed_quoting(3, 1, "unterminated quoted field at end of input")
        );
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse("a,b\nc,\"never closed\n").unwrap_err();
        assert_eq!(
            err,
            Error::malformed_quoting(2, 3, "unterminated quoted field at end of input")
        );
    }

    #[test]
    fn test_stray_character_after_closing_quote() {
        let err = parse("\"abc\"x,y\n").unwrap_err();
        match err {
            Error::MalformedQuoting { line, col, .. } => {
                assert_eq!(line, 1);
                assert_eq!(col, 6);
            }
            other => panic!("Expected malformed quoting, got {:?}", other),
        }
    }

    #[test]
    fn test_iterator_fused_after_error() {
        let mut tokenizer = Tokenizer::from_str("\"a\"b\nc\n", Dialect::new());
        assert!(tokenizer.next().unwrap().is_err());
        assert!(tokenizer.next().is_none());
    }

    #[test]
    fn test_custom_dialect() {
        let dialect = Dialect::new().with_delimiter(';').with_quote('\'');
        let rows: Vec<Row> = Tokenizer::from_str("a;'b;c';'it''s'\n", dialect)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows, vec![row!["a", "b;c", "it's"]]);
    }

    #[test]
    fn test_whitespace_preserved_by_default() {
        let rows = parse(" a , b \n").unwrap();
        assert_eq!(rows, vec![row![" a ", " b "]]);
    }

    #[test]
    fn test_trim_applies_to_unquoted_only() {
        let dialect = Dialect::new().with_trim(true);
        let rows: Vec<Row> = Tokenizer::from_str(" a ,\" b \"\n", dialect)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows, vec![row!["a", " b "]]);
    }
}
