//! # csvstream
//!
//! Resumable, line-windowed streaming CSV reader.
//!
//! Records are exposed one at a time, either synchronously through
//! [`CsvReader`] or asynchronously through [`Parser::advance`]. Reading can be
//! restricted to a window of lines: `from_line` records are skipped when the
//! reader is created, and at most `to_line` records are delivered afterwards.
//! Only the current record is held in memory, so arbitrarily large files can
//! be scanned, paused and resumed from a known line.
//!
//! ## Quick Start
//!
//! ```no_run
//! use csvstream::{Parser, ParserOptions};
//!
//! # async fn run() -> csvstream::Result<()> {
//! // Resume a scan after 50_000 records, then read at most 50_000 more
//! let options = ParserOptions::builder()
//!     .delimiter(";")
//!     .from_line(50_000)
//!     .to_line(50_000)
//!     .resolve()?;
//!
//! let parser = Parser::open("dataset.csv", options)?;
//! while let Some(record) = parser.advance().await?.into_record() {
//!     println!("{:?}", record);
//! }
//! println!("processed {} records", parser.current_line());
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `serde`: deserialize [`RawParserOptions`] from host configuration

pub mod csv;
pub mod csv_reader;
pub mod error;
pub mod options;
pub mod parser;
pub mod types;

pub use crate::csv::{CsvDecoder, RecordDecoder};
pub use csv_reader::{CsvReader, CsvRowIterator};
pub use error::{CsvStreamError, DecodeError, Result};
pub use options::{ParserOptions, RawParserOptions};
pub use parser::{Advance, Parser};
pub use types::{AdvanceResult, ReaderState};
