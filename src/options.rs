//! Parser options: raw user configuration and its validated form

use crate::error::{CsvStreamError, Result};

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Characters the decoder cannot use as a field separator
const FORBIDDEN_DELIMITERS: [char; 3] = ['"', '\r', '\n'];

/// Validated, immutable parser options
///
/// Produced by [`RawParserOptions::resolve`]. `from_line` and `to_line` are
/// optional so that "not set" never collides with a legitimate `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    delimiter: char,
    skip_first_line: bool,
    from_line: Option<u64>,
    to_line: Option<u64>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            delimiter: ',',
            skip_first_line: false,
            from_line: None,
            to_line: None,
        }
    }
}

impl ParserOptions {
    /// Start building options from an empty raw configuration
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use csvstream::ParserOptions;
    ///
    /// let options = ParserOptions::builder()
    ///     .delimiter(";")
    ///     .from_line(100)
    ///     .to_line(200)
    ///     .resolve()
    ///     .unwrap();
    /// assert_eq!(options.delimiter(), ';');
    /// ```
    pub fn builder() -> RawParserOptions {
        RawParserOptions::default()
    }

    /// Field separator
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Field separator as the single byte the decoder splits on
    pub fn delimiter_byte(&self) -> u8 {
        // ASCII is enforced by resolve
        self.delimiter as u8
    }

    /// Whether a single header record is discarded
    pub fn skip_first_line(&self) -> bool {
        self.skip_first_line
    }

    /// Number of leading records discarded before reading, if set
    pub fn from_line(&self) -> Option<u64> {
        self.from_line
    }

    /// Exclusive upper bound on records delivered after the skip, if set
    pub fn to_line(&self) -> Option<u64> {
        self.to_line
    }

    /// Number of records the leading-line skip will consume
    ///
    /// An explicit non-zero `from_line` takes precedence over the header skip:
    /// the header is assumed to be part of that count.
    pub fn leading_skip(&self) -> u64 {
        match self.from_line {
            Some(n) if n > 0 => n,
            _ if self.skip_first_line => 1,
            _ => 0,
        }
    }
}

/// Loosely-typed options as handed over by a host (script engine, config file)
///
/// Every field is optional; missing fields take their defaults during
/// [`resolve`](Self::resolve). With the `serde` feature this deserializes from
/// camelCase keys (`delimiter`, `skipFirstLine`, `fromLine`, `toLine`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize),
    serde(rename_all = "camelCase", deny_unknown_fields)
)]
pub struct RawParserOptions {
    pub delimiter: Option<String>,
    pub skip_first_line: Option<bool>,
    pub from_line: Option<i64>,
    pub to_line: Option<i64>,
}

impl RawParserOptions {
    /// Set the delimiter (builder pattern)
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Set header skipping (builder pattern)
    pub fn skip_first_line(mut self, skip: bool) -> Self {
        self.skip_first_line = Some(skip);
        self
    }

    /// Set the starting line (builder pattern)
    pub fn from_line(mut self, line: i64) -> Self {
        self.from_line = Some(line);
        self
    }

    /// Set the exclusive stopping line (builder pattern)
    pub fn to_line(mut self, line: i64) -> Self {
        self.to_line = Some(line);
        self
    }

    /// Validate and normalize into [`ParserOptions`]
    ///
    /// Fails with [`CsvStreamError::ConfigError`] when the delimiter is not
    /// exactly one usable ASCII character, a line number is negative, or
    /// `from_line > to_line`.
    pub fn resolve(self) -> Result<ParserOptions> {
        let mut options = ParserOptions::default();

        if let Some(delimiter) = self.delimiter {
            let mut chars = delimiter.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => {
                    return Err(CsvStreamError::ConfigError(format!(
                        "delimiter must be a single character, got {:?}",
                        delimiter
                    )))
                }
            };
            if !ch.is_ascii() {
                return Err(CsvStreamError::ConfigError(format!(
                    "delimiter must be an ASCII character, got {:?}",
                    ch
                )));
            }
            if FORBIDDEN_DELIMITERS.contains(&ch) {
                return Err(CsvStreamError::ConfigError(format!(
                    "{:?} cannot be used as a delimiter",
                    ch
                )));
            }
            options.delimiter = ch;
        }

        if let Some(skip) = self.skip_first_line {
            options.skip_first_line = skip;
        }

        options.from_line = self
            .from_line
            .map(|line| line_number("fromLine", line))
            .transpose()?;
        options.to_line = self
            .to_line
            .map(|line| line_number("toLine", line))
            .transpose()?;

        if let (Some(from), Some(to)) = (options.from_line, options.to_line) {
            if from > to {
                return Err(CsvStreamError::ConfigError(format!(
                    "fromLine must be less than or equal to toLine ({} > {})",
                    from, to
                )));
            }
        }

        Ok(options)
    }
}

impl TryFrom<RawParserOptions> for ParserOptions {
    type Error = CsvStreamError;

    fn try_from(raw: RawParserOptions) -> Result<Self> {
        raw.resolve()
    }
}

fn line_number(name: &str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| {
        CsvStreamError::ConfigError(format!(
            "{} must be a non-negative integer, got {}",
            name, value
        ))
    })
}
