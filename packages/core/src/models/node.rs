//! Node Data Structures
//!
//! This module defines the `Node` struct, the single entity of the FairTree
//! virtual file tree, together with its validation rules.
//!
//! # Architecture
//!
//! - **Flat arena**: Nodes never own their children. Hierarchy is expressed
//!   purely through `parent_id` pointers and resolved by index lookup.
//! - **Root sentinel**: `parent_id = None` means the node lives at root level.
//!   There is no materialised root node.
//! - **Stable wire shape**: The serde representation (camelCase, `type` tag,
//!   millisecond timestamps) is the snapshot record format.
//!
//! # Examples
//!
//! ```rust
//! use fairtree_core::models::{Node, NodeKind};
//!
//! let folder = Node::new_folder("raw_data", None);
//! let file = Node::new_file("survey_2023-05-01.csv", Some(folder.id.clone()));
//!
//! assert_eq!(folder.kind, NodeKind::Folder);
//! assert_eq!(file.content.as_deref(), Some(""));
//! assert_eq!(file.parent_id.as_deref(), Some(folder.id.as_str()));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Suffix appended to the name of a copied node
pub const COPY_SUFFIX: &str = " (Copy)";

/// Validation errors for Node operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Name must not be empty or whitespace")]
    EmptyName,

    #[error("Node '{0}' cannot be its own parent")]
    SelfParent(String),

    #[error("Folder '{0}' cannot carry file content")]
    FolderWithContent(String),

    #[error("Duplicate node ID: {0}")]
    DuplicateId(String),
}

/// Kind of a node. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Folder => "folder",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A file or folder in the virtual tree.
///
/// # Fields
///
/// - `id`: Unique identifier (UUID v4), never reused
/// - `parent_id`: Containing folder, `None` for root level
/// - `name`: Display name, no sibling uniqueness is enforced
/// - `kind`: File or Folder
/// - `content`: Opaque placeholder payload, `Some` only for files
/// - `created_at`: Creation timestamp (millisecond precision on the wire)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,

    pub parent_id: Option<String>,

    pub name: String,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Node {
    /// Create a new node with an auto-generated UUID.
    ///
    /// Files start with empty content, folders with none.
    pub fn new(name: impl Into<String>, kind: NodeKind, parent_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            parent_id,
            name: name.into(),
            kind,
            content: match kind {
                NodeKind::File => Some(String::new()),
                NodeKind::Folder => None,
            },
            created_at: now_millis(),
        }
    }

    pub fn new_folder(name: impl Into<String>, parent_id: Option<String>) -> Self {
        Self::new(name, NodeKind::Folder, parent_id)
    }

    pub fn new_file(name: impl Into<String>, parent_id: Option<String>) -> Self {
        Self::new(name, NodeKind::File, parent_id)
    }

    /// Shallow duplicate placed under `destination`.
    ///
    /// The copy gets a fresh id and the ` (Copy)` name suffix; kind, content
    /// and creation time are carried over unchanged. Children are never
    /// duplicated.
    ///
    /// ```rust
    /// # use fairtree_core::models::Node;
    /// let original = Node::new_file("draft.txt", None);
    /// let copy = original.duplicate(Some("folder-b".to_string()));
    ///
    /// assert_ne!(copy.id, original.id);
    /// assert_eq!(copy.name, "draft.txt (Copy)");
    /// assert_eq!(copy.parent_id.as_deref(), Some("folder-b"));
    /// assert_eq!(copy.created_at, original.created_at);
    /// ```
    pub fn duplicate(&self, destination: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            parent_id: destination,
            name: format!("{}{}", self.name, COPY_SUFFIX),
            kind: self.kind,
            content: self.content.clone(),
            created_at: self.created_at,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Whether this node sits at root level
    pub fn is_root_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Validate node structure and required fields
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - `id` is empty
    /// - the node references itself as parent
    /// - a folder carries content
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }

        if self.parent_id.as_deref() == Some(self.id.as_str()) {
            return Err(ValidationError::SelfParent(self.id.clone()));
        }

        if self.is_folder() && self.content.is_some() {
            return Err(ValidationError::FolderWithContent(self.id.clone()));
        }

        Ok(())
    }
}

/// Current time truncated to milliseconds so snapshots round-trip exactly
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Result of a delete operation
///
/// Deletion is idempotent: removing a node that does not exist succeeds with
/// `existed = false` and an empty `removed_ids`.
///
/// ```rust
/// use fairtree_core::models::DeleteResult;
///
/// let result = DeleteResult::not_found();
/// assert!(!result.existed);
/// assert!(result.removed_ids.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    /// Whether the node existed before deletion
    pub existed: bool,

    /// Every removed id (the node and its whole subtree), in collection order
    pub removed_ids: Vec<String>,
}

impl DeleteResult {
    pub fn removed(removed_ids: Vec<String>) -> Self {
        Self {
            existed: true,
            removed_ids,
        }
    }

    pub fn not_found() -> Self {
        Self {
            existed: false,
            removed_ids: Vec::new(),
        }
    }
}
