//! CSV serialization.
//!
//! This module provides the [`Serializer`], which renders rows back to delimited
//! text in a given [`Dialect`].
//!
//! ## Quoting
//!
//! A field is wrapped in the quote character when it contains the delimiter, the
//! quote character, `\r` or `\n`. When the dialect trims, a field that starts or
//! ends with whitespace is quoted as well, since the tokenizer only trims unquoted
//! fields. Inside a quoted field every quote is doubled. Every other field is
//! written verbatim, so serialization exactly inverts the
//! [`Tokenizer`](crate::Tokenizer).
//!
//! ```rust
//! use csv_width::{row, Dialect, Serializer};
//!
//! let mut serializer = Serializer::new(&Dialect::new());
//! let line = serializer.serialize_row(&row!["He said \"hi\", twice", "plain"]);
//! assert_eq!(line, "\"He said \"\"hi\"\", twice\",plain\n");
//! ```
//!
//! ## Direct Serializer Usage
//!
//! Rows can be accumulated and taken out as one string:
//!
//! ```rust
//! use csv_width::{row, Dialect, LineTerminator, Serializer};
//!
//! let mut serializer = Serializer::with_terminator(&Dialect::new(), LineTerminator::CrLf);
//! serializer.push_row(&row!["a", "b"]);
//! serializer.push_row(&row!["1", "2"]);
//! assert_eq!(serializer.into_inner(), "a,b\r\n1,2\r\n");
//! ```

use crate::options::is_line_break;
use crate::{Dialect, Escape, LineTerminator, Result};
use std::io::Write;

/// Returns true when `field` must be quoted to survive a round-trip in `dialect`.
///
/// # Examples
///
/// ```rust
/// use csv_width::{requires_quoting, Dialect};
///
/// let dialect = Dialect::new();
/// assert!(requires_quoting("a,b", &dialect));
/// assert!(requires_quoting("line\nbreak", &dialect));
/// assert!(!requires_quoting("plain text", &dialect));
///
/// // Surrounding whitespace would be lost on a trimming reparse.
/// assert!(requires_quoting(" NA ", &dialect.with_trim(true)));
/// ```
#[inline]
pub fn requires_quoting(field: &str, dialect: &Dialect) -> bool {
    field
        .chars()
        .any(|ch| ch == dialect.delimiter || ch == dialect.quote || is_line_break(ch))
        || (dialect.trim
            && (field.starts_with(char::is_whitespace) || field.ends_with(char::is_whitespace)))
}

/// The CSV serializer.
///
/// Keeps one output buffer that is reused for every row.
pub struct Serializer {
    output: String,
    dialect: Dialect,
    terminator: &'static str,
}

impl Serializer {
    /// Creates a serializer using the dialect's own terminator (`Auto` writes LF).
    pub fn new(dialect: &Dialect) -> Self {
        Self::with_terminator(dialect, dialect.line_terminator)
    }

    /// Creates a serializer with an explicitly resolved terminator.
    pub fn with_terminator(dialect: &Dialect, terminator: LineTerminator) -> Self {
        Serializer {
            output: String::with_capacity(256),
            dialect: dialect.clone(),
            terminator: terminator.as_str(),
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    #[inline]
    fn write_field(&mut self, field: &str) {
        if requires_quoting(field, &self.dialect) {
            let quote = self.dialect.quote;
            self.output.push(quote);
            for ch in field.chars() {
                match self.dialect.escape {
                    Escape::Doubled if ch == quote => self.output.push(quote),
                    Escape::Doubled => {}
                }
                self.output.push(ch);
            }
            self.output.push(quote);
        } else {
            self.output.push_str(field);
        }
    }

    /// Appends one record, terminator included, to the output buffer.
    pub fn push_row(&mut self, row: &[String]) {
        // A lone empty field would read back as a blank, zero-field line.
        if let [only] = row {
            if only.is_empty() {
                let quote = self.dialect.quote;
                self.output.push(quote);
                self.output.push(quote);
                self.output.push_str(self.terminator);
                return;
            }
        }

        for (i, field) in row.iter().enumerate() {
            if i > 0 {
                self.output.push(self.dialect.delimiter);
            }
            self.write_field(field);
        }
        self.output.push_str(self.terminator);
    }

    /// Renders a single record and returns the line, terminator included.
    pub fn serialize_row(&mut self, row: &[String]) -> &str {
        self.output.clear();
        self.push_row(row);
        &self.output
    }

    /// Renders a single record straight into `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) when the writer fails.
    pub fn write_row<W: Write>(&mut self, writer: &mut W, row: &[String]) -> Result<()> {
        self.serialize_row(row);
        writer.write_all(self.output.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tokenizer;

    fn line(row: &[String]) -> String {
        Serializer::new(&Dialect::new()).serialize_row(row).to_string()
    }

    #[test]
    fn test_plain_fields_verbatim() {
        assert_eq!(line(&row!["1", "Alice", "alice@x.com"]), "1,Alice,alice@x.com\n");
    }

    #[test]
    fn test_quoting_rule() {
        assert_eq!(
            line(&row!["He said \"hi\", twice"]),
            "\"He said \"\"hi\"\", twice\"\n"
        );
        assert_eq!(line(&row!["multi\nline", "x"]), "\"multi\nline\",x\n");
        assert_eq!(line(&row!["cr\rhere"]), "\"cr\rhere\"\n");
    }

    #[test]
    fn test_whitespace_not_quoted() {
        assert_eq!(line(&row![" padded ", "\ttab"]), " padded ,\ttab\n");
    }

    #[test]
    fn test_trim_dialect_quotes_surrounding_whitespace() {
        let dialect = Dialect::new().with_trim(true);
        let mut serializer = Serializer::new(&dialect);
        assert_eq!(
            serializer.serialize_row(&row![" x ", "y\t", "\u{a0}z", "a b"]),
            "\" x \",\"y\t\",\"\u{a0}z\",a b\n"
        );

        let text = serializer.serialize_row(&row![" NA ", "kept"]).to_string();
        let parsed: Vec<_> = Tokenizer::from_str(&text, dialect)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(parsed, vec![row![" NA ", "kept"]]);
    }

    #[test]
    fn test_empty_rows() {
        assert_eq!(line(&row![]), "\n");
        assert_eq!(line(&row![""]), "\"\"\n");
        assert_eq!(line(&row!["", ""]), ",\n");
    }

    #[test]
    fn test_dialect_specific_quoting() {
        let dialect = Dialect::tsv();
        let mut serializer = Serializer::new(&dialect);
        assert_eq!(serializer.serialize_row(&row!["a,b", "c\td"]), "a,b\t\"c\td\"\n");
    }

    #[test]
    fn test_write_row() {
        let mut serializer = Serializer::with_terminator(&Dialect::new(), LineTerminator::CrLf);
        let mut out = Vec::new();
        serializer.write_row(&mut out, &row!["a", "b"]).unwrap();
        serializer.write_row(&mut out, &row!["c"]).unwrap();
        assert_eq!(out, b"a,b\r\nc\r\n");
    }

    #[test]
    fn test_reparse_reproduces_rows() {
        let rows = vec![
            row!["He said \"hi\", twice", "", "x"],
            row![""],
            row![],
            row!["a\r\nb", "\"", ","],
        ];
        let mut serializer = Serializer::new(&Dialect::new());
        for row in &rows {
            serializer.push_row(row);
        }
        let text = serializer.into_inner();

        let parsed: Vec<_> = Tokenizer::from_str(&text, Dialect::new())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(parsed, rows);
    }
}
