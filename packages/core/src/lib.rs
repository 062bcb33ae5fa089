//! FairTree Core Business Logic Layer
//!
//! This crate provides the virtual file tree and the naming compliance scorer
//! for FairTree, a client-side curator of simulated file collections.
//!
//! # Architecture
//!
//! - **Flat arena**: Nodes are stored in insertion order and linked only by `parent_id`
//! - **Single owner**: `TreeStore` owns the collection; hosts hold one instance
//! - **Opaque snapshots**: The full collection is handed to a `SnapshotStore` after every mutation
//! - **Pure scoring**: The compliance report is recomputed from scratch on demand
//!
//! # Modules
//!
//! - [`models`] - Data structures (Node, NodeKind, DeleteResult)
//! - [`services`] - Tree store and compliance scorer
//! - [`db`] - Snapshot persistence and domain events
//! - [`config`] - Host configuration
//! - [`utils`] - Listing import

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::{FairtreeConfig, StoreConfig};
pub use models::*;
pub use services::*;
