//! Error types for CSV tokenizing, normalization and serialization.
//!
//! Every error is fatal for the run that produced it: the pipeline stops at the
//! first failure and never tries to resynchronize.
//!
//! ## Error Categories
//!
//! - **Empty input**: the stream holds no record, so no header width exists
//! - **Malformed quoting**: unterminated quoted field or stray character after a
//!   closing quote, with line/column information
//! - **Encoding errors**: byte sequence invalid for the declared encoding
//! - **I/O errors**: read or write failures on the underlying streams
//! - **Configuration errors**: unknown encoding label or unusable dialect
//!
//! ## Examples
//!
//! ```rust
//! use csv_width::{normalize_str, Error};
//!
//! let result = normalize_str("a,b\n\"unterminated,c\n");
//! assert!(matches!(result, Err(Error::MalformedQuoting { .. })));
//!
//! if let Err(err) = result {
//!     eprintln!("Normalize failed: {}", err);
//! }
//! ```

use std::io;
use thiserror::Error;

/// Represents all possible errors raised while normalizing a table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The input contained no record at all.
    #[error("Empty input: no header row to derive the column count from")]
    EmptyInput,

    /// Quoted field syntax that cannot be completed.
    #[error("Malformed quoting at line {line}, column {col}: {msg}")]
    MalformedQuoting { line: usize, col: usize, msg: String },

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Invalid byte sequence for the declared encoding.
    #[error("Invalid {encoding} byte sequence near byte offset {offset}")]
    Encoding { encoding: String, offset: u64 },

    /// The encoding label does not name an encoding known to the decoder.
    #[error("Unknown encoding label: {0}")]
    UnknownEncoding(String),

    /// The dialect cannot frame a table unambiguously.
    #[error("Invalid dialect: {0}")]
    InvalidDialect(String),

    /// A data row was wider than the header and the truncate policy rejects it.
    #[error("Record {record} has {found} fields, header defines {expected}")]
    RowTooWide {
        record: usize,
        found: usize,
        expected: usize,
    },
}

impl Error {
    /// Creates a malformed quoting error at the given position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use csv_width::Error;
    ///
    /// let err = Error::malformed_quoting(3, 7, "unterminated quoted field");
    /// assert!(err.to_string().contains("line 3"));
    /// ```
    pub fn malformed_quoting(line: usize, col: usize, msg: &str) -> Self {
        Error::MalformedQuoting {
            line,
            col,
            msg: msg.to_string(),
        }
    }

    /// Creates an encoding error for a malformed byte sequence.
    pub fn encoding(encoding: &str, offset: u64) -> Self {
        Error::Encoding {
            encoding: encoding.to_string(),
            offset,
        }
    }

    /// Creates an I/O error for stream reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Creates an invalid dialect error.
    pub fn invalid_dialect(msg: &str) -> Self {
        Error::InvalidDialect(msg.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(&err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
