//! Snapshot Persistence Error Types
//!
//! This module defines error types for snapshot persistence, covering I/O
//! failures, serialization failures and unreadable snapshot contents.

use std::path::PathBuf;
use thiserror::Error;

/// Snapshot persistence errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Failed to read or write the snapshot file
    #[error("Snapshot I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize or deserialize the node collection
    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot backend is unusable (poisoned lock, missing directory, ...)
    #[error("Snapshot backend unavailable: {0}")]
    Unavailable(String),
}

impl SnapshotError {
    /// Create an I/O error bound to the snapshot path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an unavailable-backend error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
