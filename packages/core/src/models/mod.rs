//! Data Models
//!
//! This module contains the core data structures used throughout FairTree:
//!
//! - `Node` - The single file/folder entity of the virtual tree
//! - `DeleteResult` - Outcome of a cascading delete
//!
//! Hierarchy is expressed only through `parent_id`; see `services::TreeStore`
//! for traversal.

mod node;

pub use node::{DeleteResult, Node, NodeKind, ValidationError, COPY_SUFFIX};
