//! Configuration options for tokenizing and normalizing tables.
//!
//! This module provides types to describe the input table and the normalization
//! policy:
//!
//! - [`Dialect`]: punctuation conventions (delimiter, quote, escape, line terminator)
//! - [`LineTerminator`]: record terminator written on output (LF, CRLF or auto-detected)
//! - [`TruncatePolicy`]: what to do with rows wider than the header
//! - [`NormalizeOptions`]: dialect plus policy, pad value and input encoding
//!
//! All options implement `Serialize`/`Deserialize` with per-field defaults, so a
//! partial configuration document is enough.
//!
//! ## Examples
//!
//! ```rust
//! use csv_width::{Dialect, LineTerminator, NormalizeOptions, TruncatePolicy};
//!
//! // Semicolon separated, CRLF output
//! let dialect = Dialect::new()
//!     .with_delimiter(';')
//!     .with_line_terminator(LineTerminator::CrLf);
//!
//! let options = NormalizeOptions::new()
//!     .with_dialect(dialect)
//!     .with_truncate_policy(TruncatePolicy::Reject)
//!     .with_pad_value("NA");
//! assert_eq!(options.dialect.delimiter, ';');
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Record terminator convention.
///
/// The tokenizer accepts `\n`, `\r\n` and a lone `\r` on input regardless of this
/// setting. It controls what the serializer writes.
///
/// # Examples
///
/// ```rust
/// use csv_width::LineTerminator;
///
/// assert_eq!(LineTerminator::Lf.as_str(), "\n");
/// assert_eq!(LineTerminator::CrLf.as_str(), "\r\n");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTerminator {
    Lf,
    CrLf,
    /// Reuse the terminator of the first input record, LF if it has none.
    #[default]
    Auto,
}

impl LineTerminator {
    /// Returns the terminator text. `Auto` resolves to LF.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineTerminator::CrLf => "\r\n",
            LineTerminator::Lf | LineTerminator::Auto => "\n",
        }
    }

    /// Resolves `Auto` against the terminator detected on input.
    #[must_use]
    pub fn resolve(self, detected: Option<LineTerminator>) -> LineTerminator {
        match self {
            LineTerminator::Auto => detected.unwrap_or(LineTerminator::Lf),
            explicit => explicit,
        }
    }
}

/// How quote characters are escaped inside a quoted field.
///
/// Doubling is the only convention the tokenizer understands, so this is a fixed
/// setting: it exists to keep serialized configurations explicit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Escape {
    /// A literal quote is written as two consecutive quotes.
    #[default]
    Doubled,
}

/// Policy for data rows that have more fields than the header.
///
/// None of the choices is forced by the data: a row that is too wide is malformed,
/// and which fields matter is application-dependent. `DropTrailing` treats the
/// rightmost fields as least significant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncatePolicy {
    /// Keep the leftmost `target_width` fields.
    #[default]
    #[serde(alias = "trailing")]
    DropTrailing,
    /// Keep the rightmost `target_width` fields.
    #[serde(alias = "leading")]
    DropLeading,
    /// Fail the run with [`Error::RowTooWide`].
    Reject,
}

/// Punctuation conventions framing a delimited-text table.
///
/// # Examples
///
/// ```rust
/// use csv_width::Dialect;
///
/// let dialect = Dialect::new();
/// assert_eq!(dialect.delimiter, ',');
/// assert_eq!(dialect.quote, '"');
/// assert!(!dialect.trim);
///
/// let tsv = Dialect::tsv();
/// assert_eq!(tsv.delimiter, '\t');
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialect {
    pub delimiter: char,
    pub quote: char,
    pub escape: Escape,
    pub line_terminator: LineTerminator,
    /// Strip surrounding whitespace from unquoted fields.
    pub trim: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect {
            delimiter: ',',
            quote: '"',
            escape: Escape::default(),
            line_terminator: LineTerminator::default(),
            trim: false,
        }
    }
}

impl Dialect {
    /// Creates the default dialect (comma, double quote, auto-detected terminator).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tab separated values.
    #[must_use]
    pub fn tsv() -> Self {
        Dialect {
            delimiter: '\t',
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    #[must_use]
    pub fn with_line_terminator(mut self, line_terminator: LineTerminator) -> Self {
        self.line_terminator = line_terminator;
        self
    }

    #[must_use]
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Checks that the dialect can frame a table unambiguously.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDialect`] when delimiter and quote coincide or when
    /// either of them is a line terminator character.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use csv_width::Dialect;
    ///
    /// assert!(Dialect::new().validate().is_ok());
    /// assert!(Dialect::new().with_quote(',').validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.delimiter == self.quote {
            return Err(Error::invalid_dialect(
                "delimiter and quote must be different characters",
            ));
        }
        for (name, ch) in [("delimiter", self.delimiter), ("quote", self.quote)] {
            if is_line_break(ch) {
                return Err(Error::InvalidDialect(format!(
                    "{} cannot be a line terminator character",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[inline]
pub(crate) fn is_line_break(ch: char) -> bool {
    ch == '\n' || ch == '\r'
}

/// Complete configuration of a normalization run.
///
/// # Examples
///
/// ```rust
/// use csv_width::{NormalizeOptions, TruncatePolicy};
///
/// let options = NormalizeOptions::new();
/// assert_eq!(options.truncate_policy, TruncatePolicy::DropTrailing);
/// assert_eq!(options.pad_value, "");
/// assert_eq!(options.encoding, "utf-8");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    pub dialect: Dialect,
    pub truncate_policy: TruncatePolicy,
    pub pad_value: String,
    /// WHATWG encoding label of the input, e.g. `utf-8`, `windows-1252`.
    pub encoding: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions {
            dialect: Dialect::default(),
            truncate_policy: TruncatePolicy::default(),
            pad_value: String::new(),
            encoding: "utf-8".to_string(),
        }
    }
}

impl NormalizeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    #[must_use]
    pub fn with_truncate_policy(mut self, policy: TruncatePolicy) -> Self {
        self.truncate_policy = policy;
        self
    }

    /// Sets the value appended to rows shorter than the header.
    #[must_use]
    pub fn with_pad_value(mut self, pad_value: impl Into<String>) -> Self {
        self.pad_value = pad_value.into();
        self
    }

    /// Sets the declared input encoding by label.
    #[must_use]
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = label.into();
        self
    }
}
