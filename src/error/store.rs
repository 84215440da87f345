//! Snapshot persistence errors.

use std::path::PathBuf;
use thiserror::Error;

/// Error raised while reading or writing the durable snapshot file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the file failed at the filesystem level.
    #[error("snapshot I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but does not contain a valid snapshot.
    #[error("snapshot at {} could not be decoded: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory state could not be serialized.
    #[error("snapshot could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
}
