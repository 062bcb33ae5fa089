//! Business Services
//!
//! This module contains the core business logic services:
//!
//! - `TreeStore` - CRUD operations and hierarchy management over the node arena
//! - `compliance` - Naming rule scoring over any node collection
//!
//! The scorer depends only on the node shape; the tree store calls into it
//! for convenience but never the other way round.

pub mod compliance;
pub mod error;
pub mod tree_store;

pub use compliance::{
    check_name, score_nodes, ComplianceIssue, ComplianceReport, IssueCategory, NameCheck,
    ScoreGrade, Severity,
};
pub use error::TreeStoreError;
pub use tree_store::{validate_collection, FolderTreeNode, TreeStore};
