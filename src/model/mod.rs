//! Domain model types (pure).
//!
//! A record is any JSON value read from the input array; a slice is a
//! fixed-length run of consecutive records forming one table row.

pub mod error;

pub use error::{AppError, DataFormatError, TableError, TransformError};

/// One logged command or event.
pub type Record = serde_json::Value;

/// A fixed-size group of consecutive records representing one trial.
pub type Slice = Vec<Record>;
