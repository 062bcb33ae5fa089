//! Service Layer Error Types
//!
//! This module defines error types for tree store operations. None of these
//! conditions is fatal: every error is raised before the collection is
//! touched, so a failed operation leaves the store exactly as it was.

use crate::db::SnapshotError;
use crate::models::ValidationError;
use thiserror::Error;

/// Tree store operation errors
#[derive(Error, Debug)]
pub enum TreeStoreError {
    /// Node not found by ID
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    /// Move would make a node its own parent or ancestor
    #[error("Invalid move: {context}")]
    InvalidMove { context: String },

    /// Referenced parent does not exist
    #[error("Invalid parent node: {parent_id}")]
    InvalidParent { parent_id: String },

    /// Referenced parent is a file
    #[error("Parent node is not a folder: {parent_id}")]
    ParentNotFolder { parent_id: String },

    /// Validation failed for node
    #[error("Node validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// A supplied collection breaks a structural invariant
    #[error("Corrupt node collection: {0}")]
    CorruptCollection(String),

    /// Snapshot persistence failed
    #[error("Snapshot persistence failed: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl TreeStoreError {
    /// Create a node not found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    /// Create an invalid move error
    pub fn invalid_move(context: impl Into<String>) -> Self {
        Self::InvalidMove {
            context: context.into(),
        }
    }

    /// Create an invalid parent error
    pub fn invalid_parent(parent_id: impl Into<String>) -> Self {
        Self::InvalidParent {
            parent_id: parent_id.into(),
        }
    }

    /// Create a parent-not-folder error
    pub fn parent_not_folder(parent_id: impl Into<String>) -> Self {
        Self::ParentNotFolder {
            parent_id: parent_id.into(),
        }
    }

    /// Create a corrupt collection error
    pub fn corrupt_collection(msg: impl Into<String>) -> Self {
        Self::CorruptCollection(msg.into())
    }

    /// Whether the host should present this as a notice to the end user
    /// rather than treat it as an infrastructure failure
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::NodeNotFound { .. }
                | Self::InvalidMove { .. }
                | Self::InvalidParent { .. }
                | Self::ParentNotFolder { .. }
                | Self::ValidationFailed(_)
        )
    }
}
