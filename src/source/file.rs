//! File-based record source.
//!
//! The whole file is read into memory and the handle dropped before parsing,
//! so it is released on every path, including parse failures.

use crate::model::error::DataFormatError;
use crate::model::Record;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A JSON record array stored in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source for `path`. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file.
    ///
    /// # Errors
    ///
    /// Returns `DataFormatError::FileNotFound` if the file does not exist,
    /// `DataFormatError::Io` for other read failures, and the parse errors of
    /// [`parse_records`](super::parse_records).
    pub fn load(&self) -> Result<Vec<Record>, DataFormatError> {
        load_records(&self.path)
    }
}

/// Read a JSON array of records from `path`.
///
/// # Errors
///
/// See [`FileSource::load`].
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>, DataFormatError> {
    let path = path.as_ref();
    let origin = path.display().to_string();

    let contents = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            DataFormatError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DataFormatError::Io {
                origin: origin.clone(),
                source,
            }
        }
    })?;

    debug!(path = %origin, bytes = contents.len(), "Read record file");
    super::parse_records(&contents, &origin)
}
