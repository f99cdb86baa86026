//! CSV record decoding

mod decoder;

pub use decoder::{CsvDecoder, RecordDecoder};
