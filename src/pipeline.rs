//! Streaming normalization driver.
//!
//! [`Pipeline`] connects an input byte source to an output sink through the
//! tokenizer, schema resolution, the normalizer and the serializer, one record at a
//! time. Peak memory is bounded by the largest single row.
//!
//! ## Modes
//!
//! - [`Pipeline::run`]: everything on the calling thread
//! - [`Pipeline::run_threaded`]: the tokenizer runs on its own thread and feeds a
//!   bounded channel; a full channel blocks it. Output order always equals input
//!   order.
//!
//! ## Failure and cancellation
//!
//! The first error from any stage stops the run. Rows already written stay on the
//! sink; write to a temporary file and rename on success when atomicity matters.
//!
//! A [`CancelToken`] is checked between rows. Once it is set no more input is read
//! and nothing is written after the row in progress.
//!
//! ```rust
//! use csv_width::{NormalizeOptions, Pipeline};
//!
//! let input = "id,name,email\n1,Alice\n2,Bob,bob@x.com,extra\n";
//! let mut output = Vec::new();
//!
//! let report = Pipeline::new(NormalizeOptions::new())
//!     .run(input.as_bytes(), &mut output)
//!     .unwrap();
//!
//! assert_eq!(report.padded, 1);
//! assert_eq!(report.truncated, 1);
//! assert_eq!(
//!     String::from_utf8(output).unwrap(),
//!     "id,name,email\n1,Alice,\n2,Bob,bob@x.com\n"
//! );
//! ```

use crate::decode::encoding_for_label;
use crate::normalizer::{Adjustment, Normalizer};
use crate::{
    resolve_schema, Error, LineTerminator, NormalizeOptions, Result, Row, Schema, Serializer,
    Tokenizer,
};
use encoding_rs::Encoding;
use std::io::{BufWriter, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

/// Default number of rows buffered between the tokenizer thread and the writer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Shared stop signal for a running pipeline.
///
/// Clones share the same flag, so one clone can be handed to a signal handler or
/// another thread while the pipeline holds the other.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Summary of a finished run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub target_width: usize,
    /// Records written, header included.
    pub rows_written: usize,
    pub padded: usize,
    pub truncated: usize,
    /// True when the run stopped on its [`CancelToken`].
    pub cancelled: bool,
    /// Terminator used for the output.
    pub line_terminator: LineTerminator,
}

/// Header row and what was learned from it.
struct Header {
    schema: Schema,
    row: Row,
    terminator: Option<LineTerminator>,
}

/// The pipeline driver.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    options: NormalizeOptions,
    cancel: CancelToken,
}

impl Pipeline {
    pub fn new(options: NormalizeOptions) -> Self {
        Pipeline {
            options,
            cancel: CancelToken::new(),
        }
    }

    /// Replaces the pipeline's stop signal with a caller-owned one.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn prepare(&self) -> Result<&'static Encoding> {
        self.options.dialect.validate()?;
        encoding_for_label(&self.options.encoding)
    }

    fn cancelled_before_start(&self) -> Report {
        tracing::warn!("pipeline cancelled before reading input");
        Report {
            target_width: 0,
            rows_written: 0,
            padded: 0,
            truncated: 0,
            cancelled: true,
            line_terminator: self.options.dialect.line_terminator.resolve(None),
        }
    }

    /// Normalizes `reader` into `writer` on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage: invalid configuration, empty input,
    /// malformed quoting, undecodable bytes, I/O failure or a rejected row.
    pub fn run<R: Read, W: Write>(&self, reader: R, writer: W) -> Result<Report> {
        let encoding = self.prepare()?;
        if self.cancel.is_cancelled() {
            return Ok(self.cancelled_before_start());
        }

        let mut tokenizer =
            Tokenizer::with_encoding(reader, self.options.dialect.clone(), encoding);
        let (schema, row) = resolve_schema(&mut tokenizer)?;
        let header = Header {
            schema,
            row,
            terminator: tokenizer.detected_terminator(),
        };
        self.consume(header, tokenizer, writer)
    }

    /// Normalizes `reader` into `writer` with tokenizing on a separate thread.
    ///
    /// At most `capacity` parsed rows wait between the two threads.
    ///
    /// # Errors
    ///
    /// Same as [`Pipeline::run`].
    pub fn run_threaded<R, W>(&self, reader: R, writer: W, capacity: usize) -> Result<Report>
    where
        R: Read + Send,
        W: Write,
    {
        let encoding = self.prepare()?;
        if self.cancel.is_cancelled() {
            return Ok(self.cancelled_before_start());
        }

        let (header_tx, header_rx) = mpsc::sync_channel::<Result<Header>>(1);
        let (row_tx, row_rx) = mpsc::sync_channel::<Result<Row>>(capacity.max(1));
        let dialect = self.options.dialect.clone();
        let cancel = &self.cancel;

        thread::scope(|scope| {
            scope.spawn(move || {
                let mut tokenizer = Tokenizer::with_encoding(reader, dialect, encoding);
                let header = resolve_schema(&mut tokenizer).map(|(schema, row)| Header {
                    schema,
                    row,
                    terminator: tokenizer.detected_terminator(),
                });
                let resolved = header.is_ok();
                if header_tx.send(header).is_err() || !resolved {
                    return;
                }

                while !cancel.is_cancelled() {
                    let Some(item) = tokenizer.next() else {
                        break;
                    };
                    let failed = item.is_err();
                    // A closed channel means the writer side gave up.
                    if row_tx.send(item).is_err() || failed {
                        break;
                    }
                }
            });

            let header = header_rx
                .recv()
                .map_err(|_| Error::io("tokenizer thread stopped without a header"))??;
            self.consume(header, row_rx, writer)
        })
    }

    /// Writes the header, then normalizes and writes every remaining row.
    fn consume<I, W>(&self, header: Header, rows: I, writer: W) -> Result<Report>
    where
        I: IntoIterator<Item = Result<Row>>,
        W: Write,
    {
        let terminator = self.options.dialect.line_terminator.resolve(header.terminator);
        tracing::debug!(?terminator, "resolved output line terminator");

        let normalizer = Normalizer::with_options(header.schema, &self.options);
        let mut serializer = Serializer::with_terminator(&self.options.dialect, terminator);
        let mut writer = BufWriter::new(writer);

        let mut report = Report {
            target_width: header.schema.target_width(),
            rows_written: 0,
            padded: 0,
            truncated: 0,
            cancelled: false,
            line_terminator: terminator,
        };

        serializer.write_row(&mut writer, &header.row)?;
        report.rows_written += 1;

        let mut rows = rows.into_iter();
        let mut record = 1;
        loop {
            if self.cancel.is_cancelled() {
                tracing::warn!(rows_written = report.rows_written, "pipeline cancelled");
                report.cancelled = true;
                break;
            }
            let Some(row) = rows.next() else {
                break;
            };
            record += 1;

            let (row, adjustment) = normalizer.normalize(row?, record)?;
            match adjustment {
                Adjustment::Unchanged => {}
                Adjustment::Padded(n) => {
                    tracing::trace!(record, added = n, "padded short row");
                    report.padded += 1;
                }
                Adjustment::Truncated(n) => {
                    tracing::trace!(record, removed = n, "truncated long row");
                    report.truncated += 1;
                }
            }
            serializer.write_row(&mut writer, &row)?;
            report.rows_written += 1;
        }

        writer.flush()?;
        tracing::info!(
            target_width = report.target_width,
            rows_written = report.rows_written,
            padded = report.padded,
            truncated = report.truncated,
            "normalization finished"
        );
        Ok(report)
    }
}
