//! Error types for runtab.
//!
//! Errors use `thiserror` and compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error returned by the binary
//!   - [`DataFormatError`] - Input could not be loaded as a JSON array of records
//!   - [`TableError`] - Cell resolution, aggregation and sorting failures
//!     - [`TransformError`] - A column transform rejected its input
//!   - [`ConfigError`](crate::config::ConfigError) - Report file / CLI value problems
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing setup failures
//!   - `std::io::Error` - Writing the rendered output failed
//!
//! # Recovery Strategy
//!
//! None. Every error is fatal for the current run: the user fixes the input
//! or the column definitions and runs the report again.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::logging::LoggingError;

/// Top-level application error encompassing all failure modes.
///
/// # Examples
///
/// ```no_run
/// use runtab::model::error::{AppError, DataFormatError};
///
/// fn run() -> Result<(), AppError> {
///     // DataFormatError converts to AppError via From
///     let _records = load()?;
///     Ok(())
/// }
/// # fn load() -> Result<(), DataFormatError> { Ok(()) }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// The record source could not be loaded.
    #[error("Failed to load records: {0}")]
    DataFormat(#[from] DataFormatError),

    /// A table operation failed (missing field, bad aggregate, bad transform).
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Configuration could not be loaded or resolved.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tracing could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Writing output to stdout failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Errors encountered when loading the record sequence.
///
/// No partial table is ever produced from a source that fails here.
#[derive(Debug, Error)]
pub enum DataFormatError {
    /// The input file does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use runtab::model::error::DataFormatError;
    ///
    /// let err = DataFormatError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.json")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.json"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was attempted.
        path: PathBuf,
    },

    /// Stdin was requested but it is an interactive terminal, not a pipe.
    #[error("No input source: provide a file path or pipe a JSON array to stdin")]
    NoInput,

    /// Reading the input failed (permissions, directory instead of file, ...).
    #[error("Failed to read {origin}: {source}")]
    Io {
        /// Where the data came from (a path or `<stdin>`).
        origin: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The input is not syntactically valid JSON.
    ///
    /// `message` is the `serde_json` error text, which includes line and column.
    #[error("Invalid JSON in {origin}: {message}")]
    InvalidJson {
        /// Where the data came from.
        origin: String,
        /// Parser error message.
        message: String,
    },

    /// The input parsed, but the top-level value is not an array.
    #[error("Expected a top-level JSON array in {origin}, found {found}")]
    NotAnArray {
        /// Where the data came from.
        origin: String,
        /// JSON type name of the value that was found.
        found: &'static str,
    },
}

/// Errors raised while building, sorting, rendering or aggregating a table.
#[derive(Debug, Error)]
pub enum TableError {
    /// `commands_per_entry` must be at least one.
    #[error("commands_per_entry must be a positive integer, got {0}")]
    InvalidCommandsPerEntry(usize),

    /// The targeted record lacks the key and no default is registered.
    ///
    /// Carries the column description and the whole slice so the offending
    /// trial can be found in the input.
    ///
    /// # Examples
    ///
    /// ```
    /// use runtab::model::error::TableError;
    ///
    /// let err = TableError::MissingField {
    ///     column: r#"(0, "time")"#.to_string(),
    ///     slice: r#"[{"cmd":"run"}]"#.to_string(),
    /// };
    /// assert!(err.to_string().contains(r#"(0, "time")"#));
    /// assert!(err.to_string().contains(r#"{"cmd":"run"}"#));
    /// ```
    #[error("Missing field for column {column}\nSlice: {slice}")]
    MissingField {
        /// Column description, e.g. `(0, "time")`.
        column: String,
        /// The full slice, serialized as JSON.
        slice: String,
    },

    /// `sum` hit a value that is not a JSON number.
    #[error("Cannot sum non-numeric value {value} at {column}")]
    NotNumeric {
        /// Column description, e.g. `(1, "runtime")`.
        column: String,
        /// The offending value, serialized as JSON.
        value: String,
    },

    /// A column transform failed on a resolved value.
    #[error("Transform failed for column {column}: {source}")]
    Transform {
        /// Column description.
        column: String,
        /// What the transform rejected.
        #[source]
        source: TransformError,
    },

    /// A column index outside the registered columns.
    #[error("No column at index {index} (table has {count} columns)")]
    NoSuchColumn {
        /// Requested index.
        index: usize,
        /// Number of registered columns.
        count: usize,
    },

    /// A header label that no registered column carries.
    #[error("Unknown column header '{0}'")]
    UnknownHeader(String),
}

/// Errors raised by column transforms such as `basename` or a pattern extract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// The transform needs a string and got some other JSON value.
    #[error("Expected a string, got {0}")]
    NotAString(String),

    /// The string had no tokens to work with.
    #[error("Value is empty")]
    EmptyValue,

    /// The regular expression did not match, or its first group did not take part.
    #[error("Pattern '{pattern}' found no capture group in '{input}'")]
    NoMatch {
        /// Source of the regular expression.
        pattern: String,
        /// The text that was searched.
        input: String,
    },

    /// The regular expression failed to compile.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Source of the regular expression.
        pattern: String,
        /// Compiler message from `regex`.
        message: String,
    },

    /// A transform name that is neither `basename` nor `pattern:<regex>`.
    #[error("Unknown transform '{0}' (expected 'basename' or 'pattern:<regex>')")]
    UnknownTransform(String),
}
