//! Row width normalization.
//!
//! [`Normalizer`] is a pure transform from an input row to a row of exactly the
//! schema's target width:
//!
//! - **Short rows** get the pad value appended until they are wide enough. Existing
//!   fields keep their order and content.
//! - **Long rows** are cut according to the [`TruncatePolicy`]. The default drops
//!   trailing fields, treating the rightmost columns as least significant. This
//!   loses data; `DropLeading` and `Reject` are the alternatives.
//! - **Rows of the right width** pass through untouched.
//!
//! ```rust
//! use csv_width::{row, Normalizer, Schema};
//!
//! let normalizer = Normalizer::new(Schema::new(3));
//! let (row, _) = normalizer.normalize(row!["a"], 2).unwrap();
//! assert_eq!(row, vec!["a", "", ""]);
//! ```

use crate::{Error, NormalizeOptions, Result, Row, Schema, TruncatePolicy};

/// What [`Normalizer::normalize`] did to a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adjustment {
    Unchanged,
    /// Number of fields appended.
    Padded(usize),
    /// Number of fields removed.
    Truncated(usize),
}

#[derive(Clone, Debug)]
pub struct Normalizer {
    schema: Schema,
    policy: TruncatePolicy,
    pad_value: String,
}

impl Normalizer {
    /// Normalizer with the default policy: pad with empty strings, drop trailing fields.
    pub fn new(schema: Schema) -> Self {
        Normalizer {
            schema,
            policy: TruncatePolicy::default(),
            pad_value: String::new(),
        }
    }

    pub fn with_options(schema: Schema, options: &NormalizeOptions) -> Self {
        Normalizer {
            schema,
            policy: options.truncate_policy,
            pad_value: options.pad_value.clone(),
        }
    }

    /// Brings `row` to the target width. `record` is the 1-based record number,
    /// used only for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowTooWide`] for a row wider than the target under
    /// [`TruncatePolicy::Reject`].
    pub fn normalize(&self, mut row: Row, record: usize) -> Result<(Row, Adjustment)> {
        let width = self.schema.target_width();
        let found = row.len();

        if found < width {
            row.resize(width, self.pad_value.clone());
            return Ok((row, Adjustment::Padded(width - found)));
        }
        if found == width {
            return Ok((row, Adjustment::Unchanged));
        }

        let excess = found - width;
        match self.policy {
            TruncatePolicy::DropTrailing => row.truncate(width),
            TruncatePolicy::DropLeading => {
                row.drain(..excess);
            }
            TruncatePolicy::Reject => {
                return Err(Error::RowTooWide {
                    record,
                    found,
                    expected: width,
                })
            }
        }
        Ok((row, Adjustment::Truncated(excess)))
    }
}
