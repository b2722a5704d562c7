use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::storage::KeyValueStore) backend.
///
/// The stores log and swallow these; they only reach callers that talk to a
/// backend directly.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing a backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored document could not be encoded or decoded.
    #[error("invalid stored document: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by [`TaskStore`](crate::store::TaskStore) operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A reorder position was outside the list.
    #[error("index {index} is out of range for a list of {len} tasks")]
    IndexOutOfRange { index: usize, len: usize },
}
