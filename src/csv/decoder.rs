//! Streaming record decoder backed by the `csv` crate

use crate::error::DecodeError;
use csv::{ErrorKind, ReaderBuilder, StringRecord};
use std::io::Read;

/// Source of decoded records
///
/// `Ok(None)` signals graceful end-of-stream; any `Err` is a decode or I/O
/// failure. Implementations keep an internal position, so one instance must
/// be used by a single reader at a time.
pub trait RecordDecoder: Send {
    /// Decode the next record
    fn read_record(&mut self) -> Result<Option<Vec<String>>, DecodeError>;
}

impl<D: RecordDecoder + ?Sized> RecordDecoder for Box<D> {
    fn read_record(&mut self) -> Result<Option<Vec<String>>, DecodeError> {
        (**self).read_record()
    }
}

/// CSV decoder reading one record at a time from any [`Read`]
///
/// Only the current record is held in memory. Empty lines are skipped,
/// quoted fields may span lines, and the first record fixes the expected
/// field count unless the builder is made flexible.
///
/// # Examples
///
/// ```no_run
/// use csvstream::csv::{CsvDecoder, RecordDecoder};
///
/// let mut decoder = CsvDecoder::new("a;b\n1;2\n".as_bytes(), b';');
/// while let Some(record) = decoder.read_record().unwrap() {
///     println!("{:?}", record);
/// }
/// ```
pub struct CsvDecoder<R> {
    reader: csv::Reader<R>,
    record: StringRecord,
}

impl<R: Read> CsvDecoder<R> {
    /// Create a decoder using `delimiter` and the standard `"` quote
    pub fn new(reader: R, delimiter: u8) -> Self {
        Self::from_builder(&Self::builder(delimiter), reader)
    }

    /// Reader settings used by [`new`](Self::new), for further tuning
    ///
    /// ```no_run
    /// use csvstream::csv::CsvDecoder;
    ///
    /// let mut builder = CsvDecoder::<&[u8]>::builder(b',');
    /// builder.flexible(true);
    /// let decoder = CsvDecoder::from_builder(&builder, "a,b\n1\n".as_bytes());
    /// ```
    pub fn builder(delimiter: u8) -> ReaderBuilder {
        let mut rb = ReaderBuilder::new();
        rb.delimiter(delimiter)
            .has_headers(false) // header skipping is done by CsvReader
            .flexible(false);
        rb
    }

    /// Create a decoder from custom reader settings
    ///
    /// `has_headers` should stay off, otherwise the first record never
    /// reaches the line cursor.
    pub fn from_builder(builder: &ReaderBuilder, reader: R) -> Self {
        CsvDecoder {
            reader: builder.from_reader(reader),
            record: StringRecord::new(),
        }
    }
}

impl<R: Read + Send> RecordDecoder for CsvDecoder<R> {
    fn read_record(&mut self) -> Result<Option<Vec<String>>, DecodeError> {
        match self.reader.read_record(&mut self.record) {
            Ok(true) => Ok(Some(self.record.iter().map(str::to_owned).collect())),
            Ok(false) => Ok(None),
            Err(e) => Err(decode_error(e)),
        }
    }
}

fn decode_error(err: csv::Error) -> DecodeError {
    let message = err.to_string();
    match err.into_kind() {
        ErrorKind::Io(e) => DecodeError::Io(e),
        ErrorKind::Utf8 { pos, .. } => DecodeError::InvalidUtf8 {
            line: pos.map_or(0, |p| p.line()),
        },
        ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => DecodeError::FieldCount {
            line: pos.map_or(0, |p| p.line()),
            expected: expected_len,
            found: len,
        },
        _ => DecodeError::Malformed(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(input: &str) -> Result<Vec<Vec<String>>, DecodeError> {
        let mut decoder = CsvDecoder::new(input.as_bytes(), b',');
        let mut records = Vec::new();
        while let Some(record) = decoder.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    #[test]
    fn test_plain_records() {
        let records = decode_all("a,b\n1,2\n3,4\n").unwrap();
        assert_eq!(records, vec![vec!["a", "b"], vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn test_first_record_is_not_a_header() {
        let records = decode_all("id\n7\n").unwrap();
        assert_eq!(records[0], vec!["id"]);
    }

    #[test]
    fn test_crlf_and_empty_lines() {
        let records = decode_all("a,b\r\n\r\n1,2\r\n\n").unwrap();
        assert_eq!(records, vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn test_quoted_fields() {
        let records = decode_all("id,note\n1,\"first\nsecond\"\n2,\"a \"\"b\"\", c\"\n").unwrap();
        assert_eq!(records[1], vec!["1", "first\nsecond"]);
        assert_eq!(records[2], vec!["2", "a \"b\", c"]);
    }

    #[test]
    fn test_custom_delimiter() {
        let mut decoder = CsvDecoder::new("x|y,z\n".as_bytes(), b'|');
        assert_eq!(decoder.read_record().unwrap().unwrap(), vec!["x", "y,z"]);
    }

    #[test]
    fn test_field_count_mismatch() {
        let mut decoder = CsvDecoder::new("a,b\n1,2\n3\n".as_bytes(), b',');
        decoder.read_record().unwrap();
        decoder.read_record().unwrap();
        let err = decoder.read_record().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::FieldCount {
                line: 3,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_flexible_builder_allows_ragged_rows() {
        let mut builder = CsvDecoder::<&[u8]>::builder(b',');
        builder.flexible(true);
        let mut decoder = CsvDecoder::from_builder(&builder, "a,b\n1\n".as_bytes());
        decoder.read_record().unwrap();
        assert_eq!(decoder.read_record().unwrap().unwrap(), vec!["1"]);
    }

    #[test]
    fn test_invalid_utf8() {
        let mut decoder = CsvDecoder::new(&b"ok\n\xff\xfe\n"[..], b',');
        assert!(decoder.read_record().unwrap().is_some());
        assert!(matches!(
            decoder.read_record(),
            Err(DecodeError::InvalidUtf8 { line: 2 })
        ));
    }

    #[test]
    fn test_eof_is_repeatable() {
        let mut decoder = CsvDecoder::new("x\n".as_bytes(), b',');
        assert!(decoder.read_record().unwrap().is_some());
        assert!(decoder.read_record().unwrap().is_none());
        assert!(decoder.read_record().unwrap().is_none());
    }
}
