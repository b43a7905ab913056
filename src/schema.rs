//! Target width resolution from the header row.

use crate::{Error, Result, Row};

/// Column count every row of a run is normalized to.
///
/// Derived once from the first record and never changed afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schema {
    target_width: usize,
}

impl Schema {
    pub fn new(target_width: usize) -> Self {
        Schema { target_width }
    }

    pub fn target_width(&self) -> usize {
        self.target_width
    }
}

/// Takes the first row of the stream, fixes the schema and hands the header back
/// unchanged.
///
/// A header with no fields is legal and yields a width of zero.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] when the stream has no rows at all, or the
/// stream's own error if reading the header fails.
///
/// # Examples
///
/// ```rust
/// use csv_width::{resolve_schema, Dialect, Tokenizer};
///
/// let mut rows = Tokenizer::from_str("id,name,email\n1,Alice\n", Dialect::new());
/// let (schema, header) = resolve_schema(&mut rows).unwrap();
/// assert_eq!(schema.target_width(), 3);
/// assert_eq!(header, vec!["id", "name", "email"]);
/// ```
pub fn resolve_schema<I>(rows: &mut I) -> Result<(Schema, Row)>
where
    I: Iterator<Item = Result<Row>>,
{
    let header = rows.next().ok_or(Error::EmptyInput)??;
    let schema = Schema::new(header.len());
    tracing::debug!(target_width = schema.target_width(), "resolved schema from header");
    Ok((schema, header))
}
