//! Record sources.
//!
//! This module loads the flat JSON array of log records:
//! - File loading (read once, handle released immediately)
//! - Stdin for piped input (`-` as the path)
//! - Unified InputSource enum for both

use crate::model::error::DataFormatError;
use crate::model::Record;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

pub mod file;
pub mod stdin;

pub use file::FileSource;
pub use stdin::StdinSource;

/// Path argument that selects stdin instead of a file.
pub const STDIN_PATH: &str = "-";

/// Unified input source for a JSON record array.
///
/// Sum type enforces exactly one variant.
#[derive(Debug)]
pub enum InputSource {
    /// A JSON file on disk.
    File(FileSource),
    /// Piped stdin.
    Stdin,
}

impl InputSource {
    /// Read and parse every record from the source.
    ///
    /// # Errors
    ///
    /// Returns `DataFormatError` when the source cannot be read, is not JSON,
    /// or does not hold a top-level array.
    pub fn load(&self) -> Result<Vec<Record>, DataFormatError> {
        match self {
            InputSource::File(f) => f.load(),
            InputSource::Stdin => StdinSource::new()?.load(),
        }
    }

    /// Human-readable origin used in error messages.
    pub fn origin(&self) -> String {
        match self {
            InputSource::File(f) => f.path().display().to_string(),
            InputSource::Stdin => stdin::STDIN_ORIGIN.to_string(),
        }
    }
}

/// Pick the input source for a path argument.
///
/// `-` selects stdin; anything else is a file path. The file itself is not
/// touched until [`InputSource::load`].
pub fn detect_input_source(path: impl Into<PathBuf>) -> InputSource {
    let path = path.into();
    if path.as_os_str() == STDIN_PATH {
        InputSource::Stdin
    } else {
        InputSource::File(FileSource::new(path))
    }
}

/// Parse a JSON document whose top-level value must be an array.
///
/// Elements are kept as-is; their shape is only inspected when columns are
/// resolved.
///
/// # Errors
///
/// `DataFormatError::InvalidJson` for malformed JSON,
/// `DataFormatError::NotAnArray` for any other top-level value.
pub fn parse_records(text: &str, origin: &str) -> Result<Vec<Record>, DataFormatError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| DataFormatError::InvalidJson {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;

    match value {
        Value::Array(records) => {
            debug!(origin, count = records.len(), "Parsed record array");
            Ok(records)
        }
        other => Err(DataFormatError::NotAnArray {
            origin: origin.to_string(),
            found: json_type_name(&other),
        }),
    }
}

/// JSON type name for diagnostics.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dash_selects_stdin() {
        assert!(matches!(detect_input_source("-"), InputSource::Stdin));
    }

    #[test]
    fn other_paths_select_file() {
        let source = detect_input_source("runs.json");
        match source {
            InputSource::File(f) => assert_eq!(f.path(), std::path::Path::new("runs.json")),
            InputSource::Stdin => panic!("Expected file source"),
        }
    }

    #[test]
    fn origin_names_the_file_path() {
        let source = detect_input_source("logs/runs.json");
        assert!(source.origin().ends_with("runs.json"));
        assert_eq!(detect_input_source("-").origin(), "<stdin>");
    }

    #[test]
    fn parse_records_accepts_array_of_objects() {
        let records = parse_records(r#"[{"a": 1}, {"b": "x"}]"#, "inline").unwrap();
        assert_eq!(records, vec![json!({"a": 1}), json!({"b": "x"})]);
    }

    #[test]
    fn parse_records_accepts_empty_array() {
        let records = parse_records("[]", "inline").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn parse_records_keeps_non_object_elements() {
        let records = parse_records(r#"[1, "two", null]"#, "inline").unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn parse_records_rejects_invalid_json() {
        let result = parse_records(r#"[{"a": 1},"#, "broken.json");
        match result {
            Err(DataFormatError::InvalidJson { origin, message }) => {
                assert_eq!(origin, "broken.json");
                assert!(!message.is_empty());
            }
            other => panic!("Expected InvalidJson, got {:?}", other),
        }
    }

    #[test]
    fn parse_records_rejects_top_level_object() {
        let result = parse_records(r#"{"a": 1}"#, "obj.json");
        assert!(matches!(
            result,
            Err(DataFormatError::NotAnArray { found: "object", .. })
        ));
    }

    #[test]
    fn parse_records_rejects_top_level_scalar() {
        let result = parse_records("42", "num.json");
        assert!(matches!(
            result,
            Err(DataFormatError::NotAnArray { found: "number", .. })
        ));
    }

    #[test]
    fn load_reads_file_source() {
        let temp_dir = std::env::temp_dir();
        let test_file = temp_dir.join("runtab_source_load_file.json");
        std::fs::write(&test_file, r#"[{"t": 1}, {"t": 2}]"#).unwrap();

        let result = detect_input_source(test_file.clone()).load();

        // Cleanup
        let _ = std::fs::remove_file(&test_file);

        assert_eq!(result.unwrap().len(), 2);
    }
}
