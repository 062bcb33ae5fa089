//! Domain Events for the Tree Store
//!
//! This module defines the domain events emitted by `TreeStore` after each
//! successful mutation. Hosts subscribe to them to re-render views without
//! polling the collection.
//!
//! # Architecture
//!
//! Events are emitted using tokio's broadcast channel. `send` is synchronous
//! and works without a runtime, so a single-threaded host can drain its
//! receiver with `try_recv` after each call.
//!
//! # Event Flow
//!
//! 1. `TreeStore` applies a mutation to the in-memory arena
//! 2. The new snapshot is published to the `SnapshotStore`
//! 3. Exactly one domain event is emitted via the broadcast channel
//! 4. Rejected operations emit nothing

use crate::models::Node;

/// Domain events emitted by `TreeStore`
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    /// A node was created (create or copy)
    NodeCreated(Node),

    /// A node was renamed
    NodeUpdated(Node),

    /// A node was re-parented
    NodeMoved {
        id: String,
        old_parent_id: Option<String>,
        new_parent_id: Option<String>,
    },

    /// A node and its whole subtree were removed
    NodesDeleted { ids: Vec<String> },

    /// The collection was discarded and re-seeded
    CollectionReset { node_count: usize },
}

impl DomainEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &str {
        match self {
            DomainEvent::NodeCreated(_) => "node:created",
            DomainEvent::NodeUpdated(_) => "node:updated",
            DomainEvent::NodeMoved { .. } => "node:moved",
            DomainEvent::NodesDeleted { .. } => "nodes:deleted",
            DomainEvent::CollectionReset { .. } => "collection:reset",
        }
    }
}
