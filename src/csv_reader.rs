//! Line-windowed CSV reading: leading-line skip and the advance state machine

use crate::csv::{CsvDecoder, RecordDecoder};
use crate::error::{CsvStreamError, DecodeError, Result};
use crate::options::ParserOptions;
use crate::types::{AdvanceResult, ReaderState};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Synchronous CSV reader restricted to a window of lines
///
/// Construction validates nothing beyond the already-resolved
/// [`ParserOptions`] but performs the leading-line skip, so a reader that
/// exists is always positioned at its first deliverable record. Each
/// [`advance`](Self::advance) then performs at most one physical read.
///
/// The line cursor counts records delivered since construction. Only this
/// reader writes it; the atomic lets other threads observe progress through
/// [`cursor_handle`](Self::cursor_handle).
///
/// # Examples
///
/// ```no_run
/// use csvstream::{CsvReader, ParserOptions};
///
/// let options = ParserOptions::builder()
///     .skip_first_line(true)
///     .to_line(1000)
///     .resolve()?;
/// let mut reader = CsvReader::open("data.csv", options)?;
///
/// for row_result in reader.rows() {
///     let row = row_result?;
///     println!("{:?}", row);
/// }
/// # Ok::<(), csvstream::CsvStreamError>(())
/// ```
pub struct CsvReader<D> {
    decoder: D,
    options: ParserOptions,
    cursor: Arc<AtomicU64>,
    state: ReaderState,
    failure: Option<CsvStreamError>,
}

impl CsvReader<CsvDecoder<File>> {
    /// Open a CSV file and position it according to `options`
    pub fn open<P: AsRef<Path>>(path: P, options: ParserOptions) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(DecodeError::from)?;
        Self::from_reader(file, options)
    }
}

impl<R: Read + Send> CsvReader<CsvDecoder<R>> {
    /// Decode records from any byte source using the option's delimiter
    pub fn from_reader(reader: R, options: ParserOptions) -> Result<Self> {
        let decoder = CsvDecoder::new(reader, options.delimiter_byte());
        Self::new(decoder, options)
    }
}

impl<D: RecordDecoder> CsvReader<D> {
    /// Wrap `decoder` and perform the leading-line skip
    ///
    /// Fails with [`CsvStreamError::SkipError`] if the source ends or cannot
    /// be decoded before the skip completes.
    pub fn new(mut decoder: D, options: ParserOptions) -> Result<Self> {
        tracing::debug!(
            delimiter = %options.delimiter(),
            skip_first_line = options.skip_first_line(),
            from_line = ?options.from_line(),
            to_line = ?options.to_line(),
            "creating csv reader"
        );

        skip_leading_lines(&mut decoder, &options)?;

        Ok(CsvReader {
            decoder,
            options,
            cursor: Arc::new(AtomicU64::new(0)),
            state: ReaderState::Active,
            failure: None,
        })
    }

    /// Produce the next record of the window
    ///
    /// Returns `done` once `to_line` records were delivered or the source
    /// ended, and on every call after that. A decode failure is returned as
    /// [`CsvStreamError::ReadError`] and replayed on later calls without
    /// touching the source again.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use csvstream::{CsvReader, ParserOptions};
    ///
    /// let mut reader = CsvReader::open("data.csv", ParserOptions::default())?;
    /// loop {
    ///     let result = reader.advance()?;
    ///     if result.done {
    ///         break;
    ///     }
    ///     println!("{:?}", result.value);
    /// }
    /// # Ok::<(), csvstream::CsvStreamError>(())
    /// ```
    pub fn advance(&mut self) -> Result<AdvanceResult> {
        match self.state {
            ReaderState::Failed => {
                return Err(self.failure.clone().unwrap_or_else(|| {
                    CsvStreamError::InvalidState("reader failed earlier".to_string())
                }))
            }
            ReaderState::Exhausted => return Ok(AdvanceResult::done()),
            ReaderState::Active => {}
        }

        let line = self.cursor.load(Ordering::Acquire);
        if let Some(to_line) = self.options.to_line() {
            if line >= to_line {
                tracing::debug!(line, to_line, "csv reader reached toLine");
                self.state = ReaderState::Exhausted;
                return Ok(AdvanceResult::done());
            }
        }

        match self.decoder.read_record() {
            Ok(Some(fields)) => {
                self.cursor.fetch_add(1, Ordering::AcqRel);
                tracing::trace!(line, fields = fields.len(), "csv record");
                Ok(AdvanceResult::record(fields))
            }
            Ok(None) => {
                tracing::debug!(line, "csv reader reached end of input");
                self.state = ReaderState::Exhausted;
                Ok(AdvanceResult::done())
            }
            Err(e) => {
                tracing::warn!(line, error = %e, "csv read failed");
                let err = CsvStreamError::from(e);
                self.state = ReaderState::Failed;
                self.failure = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Get iterator over the remaining records of the window
    pub fn rows(&mut self) -> CsvRowIterator<'_, D> {
        CsvRowIterator { reader: self }
    }

    /// Number of records delivered since construction
    pub fn current_line(&self) -> u64 {
        self.cursor.load(Ordering::Acquire)
    }

    /// Shared handle on the line cursor, for observing progress elsewhere
    pub fn cursor_handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.cursor)
    }

    /// Current state of the reader
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Options the reader was built with
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }
}

fn skip_leading_lines<D: RecordDecoder>(decoder: &mut D, options: &ParserOptions) -> Result<()> {
    let from_line = options.from_line();

    if options.skip_first_line() && matches!(from_line, None | Some(0)) {
        match decoder.read_record() {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Err(CsvStreamError::SkipError(
                    "failed to skip the first line; reason: source is empty".to_string(),
                ))
            }
            Err(e) => {
                return Err(CsvStreamError::SkipError(format!(
                    "failed to skip the first line; reason: {}",
                    e
                )))
            }
        }
    }

    if let Some(from_line) = from_line.filter(|&n| n > 0) {
        for skipped in 0..from_line {
            match decoder.read_record() {
                Ok(Some(_)) => {}
                Ok(None) => {
                    return Err(CsvStreamError::SkipError(format!(
                        "failed to iterate to fromLine; reason: source ended after {} of {} lines",
                        skipped, from_line
                    )))
                }
                Err(e) => {
                    return Err(CsvStreamError::SkipError(format!(
                        "failed to iterate to fromLine; reason: {}",
                        e
                    )))
                }
            }
        }
    }

    tracing::debug!(skipped = options.leading_skip(), "skipped leading lines");
    Ok(())
}

/// Iterator over CSV rows
///
/// Ends when the reader is done. A read failure is yielded once, then the
/// iterator ends.
pub struct CsvRowIterator<'a, D> {
    reader: &'a mut CsvReader<D>,
}

impl<'a, D: RecordDecoder> Iterator for CsvRowIterator<'a, D> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reader.state() == ReaderState::Failed {
            return None;
        }
        match self.reader.advance() {
            Ok(result) => result.into_record().map(Ok),
            Err(e) => Some(Err(e)),
        }
    }
}
