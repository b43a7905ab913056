//! # csv_width
//!
//! Streaming schema-width normalization for delimited-text tables.
//!
//! ## What does it do?
//!
//! The header row of a table defines how many columns every record should have.
//! Real-world exports often disagree: trailing empty cells get dropped, stray
//! delimiters add extra ones. `csv_width` rewrites every data row to exactly the
//! header's width, padding short rows and truncating long ones, while parsing and
//! re-emitting quoted fields with embedded delimiters, line breaks and doubled quotes
//! correctly.
//!
//! ## Key Features
//!
//! - **Streaming**: one record in memory at a time, whatever the file size
//! - **Lossless quoting**: fields are re-quoted only when they need it, and output
//!   parses back to the same values
//! - **Configurable dialect**: delimiter, quote character, line terminator, trimming
//! - **Configurable policy**: pad value and truncation policy for malformed tables
//! - **Encodings**: any WHATWG encoding label on input, UTF-8 on output
//! - **No Unsafe Code**: written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ```rust
//! use csv_width::normalize_str;
//!
//! let input = "id,name,email\n1,Alice\n2,Bob,bob@x.com,extra\n3,Carol,carol@x.com\n";
//! let output = normalize_str(input).unwrap();
//! assert_eq!(
//!     output,
//!     "id,name,email\n1,Alice,\n2,Bob,bob@x.com\n3,Carol,carol@x.com\n"
//! );
//! ```
//!
//! ### Streams
//!
//! ```rust
//! use csv_width::{normalize_with_options, Dialect, NormalizeOptions, TruncatePolicy};
//!
//! let input = "a;b;c\n1;2;3;4\n";
//! let mut output = Vec::new();
//!
//! let options = NormalizeOptions::new()
//!     .with_dialect(Dialect::new().with_delimiter(';'))
//!     .with_truncate_policy(TruncatePolicy::DropLeading);
//! let report = normalize_with_options(input.as_bytes(), &mut output, options).unwrap();
//!
//! assert_eq!(report.truncated, 1);
//! assert_eq!(output, b"a;b;c\n2;3;4\n");
//! ```
//!
//! ## Guarantees
//!
//! - Every data row written has exactly as many fields as the header
//! - The header row is written unchanged
//! - Output normalized once is a fixed point: normalizing it again gives the same bytes
//! - The first error stops the run; nothing is silently dropped

#[macro_use]
pub mod macros;

pub mod decode;
pub mod error;
pub mod normalizer;
pub mod options;
pub mod pipeline;
pub mod schema;
pub mod ser;
pub mod tokenizer;

pub use error::{Error, Result};
pub use normalizer::{Adjustment, Normalizer};
pub use options::{Dialect, Escape, LineTerminator, NormalizeOptions, TruncatePolicy};
pub use pipeline::{CancelToken, Pipeline, Report};
pub use schema::{resolve_schema, Schema};
pub use ser::{requires_quoting, Serializer};
pub use tokenizer::Tokenizer;

use std::io;

/// One logical record: field values in column order.
pub type Row = Vec<String>;

/// Normalizes a UTF-8 comma-separated stream with default options.
///
/// # Errors
///
/// Returns the first error of any stage, see [`Error`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn normalize<R, W>(reader: R, writer: W) -> Result<Report>
where
    R: io::Read,
    W: io::Write,
{
    normalize_with_options(reader, writer, NormalizeOptions::default())
}

/// Normalizes a stream with custom options.
///
/// # Errors
///
/// Returns the first error of any stage, see [`Error`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn normalize_with_options<R, W>(reader: R, writer: W, options: NormalizeOptions) -> Result<Report>
where
    R: io::Read,
    W: io::Write,
{
    Pipeline::new(options).run(reader, writer)
}

/// Normalizes a table held in a string with default options.
///
/// # Errors
///
/// Returns the first error of any stage, see [`Error`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn normalize_str(input: &str) -> Result<String> {
    normalize_str_with_options(input, NormalizeOptions::default())
}

/// Normalizes a table held in a string with custom options.
///
/// The `encoding` option is ignored: the input is already text.
///
/// # Errors
///
/// Returns the first error of any stage, see [`Error`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn normalize_str_with_options(input: &str, options: NormalizeOptions) -> Result<String> {
    let options = options.with_encoding("utf-8");
    let mut output = Vec::with_capacity(input.len() + 16);
    Pipeline::new(options).run(input.as_bytes(), &mut output)?;
    String::from_utf8(output).map_err(|e| Error::encoding("UTF-8", e.utf8_error().valid_up_to() as u64))
}

/// Parses every record of `input`.
///
/// # Examples
///
/// ```rust
/// use csv_width::{parse_str, Dialect};
///
/// let rows = parse_str("a,\"multi\nline\",c\n", &Dialect::new()).unwrap();
/// assert_eq!(rows, vec![vec!["a", "multi\nline", "c"]]);
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidDialect`] or the first tokenizer error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_str(input: &str, dialect: &Dialect) -> Result<Vec<Row>> {
    dialect.validate()?;
    Tokenizer::from_str(input, dialect.clone()).collect()
}

/// Serializes rows with the dialect's terminator (`Auto` writes LF).
///
/// # Examples
///
/// ```rust
/// use csv_width::{row, rows_to_string, Dialect};
///
/// let text = rows_to_string(&[row!["a", "b,c"], row!["1", "2"]], &Dialect::new());
/// assert_eq!(text, "a,\"b,c\"\n1,2\n");
/// ```
pub fn rows_to_string(rows: &[Row], dialect: &Dialect) -> String {
    let mut serializer = Serializer::new(dialect);
    for row in rows {
        serializer.push_row(row);
    }
    serializer.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_str_round_trip() {
        let input = "h1,h2,h3\n\"He said \"\"hi\"\", twice\"\nx,y,z,w\n";
        let output = normalize_str(input).unwrap();
        assert_eq!(output, "h1,h2,h3\n\"He said \"\"hi\"\", twice\",,\nx,y,z\n");

        let rows = parse_str(&output, &Dialect::new()).unwrap();
        assert_eq!(rows[1][0], "He said \"hi\", twice");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let input = "a,b,c\n1\n2,\"x\ny\",3,4\n\n\"\"\n";
        let once = normalize_str(input).unwrap();
        let twice = normalize_str(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_stream() {
        let mut output = Vec::new();
        let report = normalize("a,b\n1\n".as_bytes(), &mut output).unwrap();
        assert_eq!(output, b"a,b\n1,\n");
        assert_eq!(report.padded, 1);
    }

    #[test]
    fn test_parse_str_rejects_bad_dialect() {
        let dialect = Dialect::new().with_delimiter('"');
        assert!(parse_str("a", &dialect).is_err());
    }

    #[test]
    fn test_rows_to_string_crlf() {
        let dialect = Dialect::new().with_line_terminator(LineTerminator::CrLf);
        assert_eq!(rows_to_string(&[row!["a"], row![""]], &dialect), "a\r\n\"\"\r\n");
    }
}
