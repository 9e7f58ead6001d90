//! Stdin-based record source for piped input.
//!
//! Reads the whole stream to EOF, then parses it as one JSON array.

use crate::model::error::DataFormatError;
use crate::model::Record;
use std::io::{IsTerminal, Read};

/// Origin label used in error messages for stdin input.
pub const STDIN_ORIGIN: &str = "<stdin>";

/// Stdin source for a piped JSON array (`cat runs.json | runtab -`).
pub struct StdinSource<R: Read> {
    reader: R,
}

impl StdinSource<std::io::Stdin> {
    /// Create a new StdinSource from stdin.
    ///
    /// # Errors
    ///
    /// Returns `DataFormatError::NoInput` if stdin is an interactive terminal,
    /// so the tool does not block waiting for typed input.
    pub fn new() -> Result<Self, DataFormatError> {
        let stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Err(DataFormatError::NoInput);
        }
        Ok(Self { reader: stdin })
    }
}

impl<R: Read> StdinSource<R> {
    /// Create a StdinSource from any reader, bypassing the terminal check.
    pub fn from_reader(reader: R) -> Self {
        Self { reader }
    }

    /// Read to EOF and parse the records.
    ///
    /// # Errors
    ///
    /// `DataFormatError::Io` if reading fails, otherwise the errors of
    /// [`parse_records`](super::parse_records).
    pub fn load(mut self) -> Result<Vec<Record>, DataFormatError> {
        let mut contents = String::new();
        self.reader
            .read_to_string(&mut contents)
            .map_err(|source| DataFormatError::Io {
                origin: STDIN_ORIGIN.to_string(),
                source,
            })?;
        super::parse_records(&contents, STDIN_ORIGIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn load_parses_piped_array() {
        let source = StdinSource::from_reader(Cursor::new(r#"[{"a": 1}, {"a": 2}]"#));
        let records = source.load().unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn load_reports_stdin_origin_on_parse_failure() {
        let source = StdinSource::from_reader(Cursor::new("{"));
        match source.load() {
            Err(DataFormatError::InvalidJson { origin, .. }) => assert_eq!(origin, "<stdin>"),
            other => panic!("Expected InvalidJson, got {:?}", other),
        }
    }

    #[test]
    fn load_reports_io_error_for_non_utf8_input() {
        let source = StdinSource::from_reader(Cursor::new(vec![0xff, 0xfe, 0xfd]));
        assert!(matches!(source.load(), Err(DataFormatError::Io { .. })));
    }
}
