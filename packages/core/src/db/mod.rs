//! Persistence Layer
//!
//! This module handles the hand-off of node collection snapshots to an
//! external store:
//!
//! - `SnapshotStore` trait, the persistence seam of the tree store
//! - In-memory and JSON file implementations
//! - Domain events broadcast after every mutation
//!
//! # Architecture
//!
//! The tree store's in-memory arena is canonical. After every successful
//! mutation the full collection is written as one opaque snapshot; there is
//! no incremental log and no migration logic.

mod error;
pub mod events;
mod snapshot_store;

pub use error::SnapshotError;
pub use events::DomainEvent;
pub use snapshot_store::{JsonFileSnapshotStore, MemorySnapshotStore, SnapshotStore};
