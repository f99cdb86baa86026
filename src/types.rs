//! Type definitions for advance results and reader state

use std::fmt;

/// Outcome of one advance call
///
/// `done == true` means no further record is available, either because the
/// `to_line` bound was reached or because the source ended; `value` is empty
/// in that case.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdvanceResult {
    /// Whether the parser has finished reading
    pub done: bool,
    /// Fields of the record just read
    pub value: Vec<String>,
}

impl AdvanceResult {
    /// A result carrying one record
    pub fn record(value: Vec<String>) -> Self {
        AdvanceResult { done: false, value }
    }

    /// The terminal result
    pub fn done() -> Self {
        AdvanceResult {
            done: true,
            value: Vec::new(),
        }
    }

    /// Consume the result, returning the record unless done
    pub fn into_record(self) -> Option<Vec<String>> {
        if self.done {
            None
        } else {
            Some(self.value)
        }
    }
}

/// State of the advance state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Records may still be produced
    Active,
    /// The bound was reached or the source ended (terminal)
    Exhausted,
    /// A read failed; the failure is replayed on every later call (terminal)
    Failed,
}

impl ReaderState {
    /// Whether no further physical read will ever be attempted
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReaderState::Active)
    }
}

impl fmt::Display for ReaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReaderState::Active => "active",
            ReaderState::Exhausted => "exhausted",
            ReaderState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}
