//! Error types for csvstream

use std::sync::Arc;
use thiserror::Error;

/// Result type alias for csvstream operations
pub type Result<T> = std::result::Result<T, CsvStreamError>;

/// Errors raised while configuring, positioning or advancing a parser
#[derive(Error, Debug, Clone)]
pub enum CsvStreamError {
    /// Options failed validation; no parser was created
    #[error("Invalid parser options: {0}")]
    ConfigError(String),

    /// Leading lines could not be skipped; no parser was created
    #[error("Skip error: {0}")]
    SkipError(String),

    /// The decoder failed while advancing
    ///
    /// The parser stays failed afterwards and replays this same error.
    #[error("Read error: {0}")]
    ReadError(#[source] Arc<DecodeError>),

    /// The parser cannot serve requests (no runtime, worker gone)
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl CsvStreamError {
    /// The decode failure behind a [`CsvStreamError::ReadError`]
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            CsvStreamError::ReadError(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Failures reported by a [`RecordDecoder`](crate::csv::RecordDecoder)
///
/// Line numbers are 1-based physical lines of the source.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: wrong number of fields (expected {expected}, found {found})")]
    FieldCount {
        line: u64,
        expected: u64,
        found: u64,
    },

    #[error("line {line}: invalid UTF-8")]
    InvalidUtf8 { line: u64 },

    /// Any other decoder failure, including custom [`RecordDecoder`](crate::csv::RecordDecoder) implementations
    #[error("{0}")]
    Malformed(String),
}

impl From<DecodeError> for CsvStreamError {
    fn from(err: DecodeError) -> Self {
        CsvStreamError::ReadError(Arc::new(err))
    }
}
