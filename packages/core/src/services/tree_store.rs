//! Tree Store - Virtual File Tree Operations
//!
//! This module provides the owner of the node collection:
//!
//! - CRUD operations (create, rename, copy, delete)
//! - Hierarchy management (move with cycle prevention, cascading delete)
//! - Navigation queries (children, breadcrumb path, folder tree)
//! - Snapshot publication and domain events after every mutation
//!
//! # Arena Model
//!
//! Nodes live in an insertion-ordered `Vec` with an id -> index map beside it.
//! Parent links are plain ids, so every traversal (children, ancestors,
//! descendants) is index lookup; nothing is ever nested by ownership.
//!
//! # Atomicity
//!
//! Every precondition is checked before the arena is touched. A rejected
//! operation leaves the collection, the snapshot and the event stream exactly
//! as they were.
//!
//! # Concurrency
//!
//! The store is a plain single-owner value: mutators take `&mut self`. A host
//! that shares it across threads wraps it in one `Mutex`/`RwLock`, which also
//! keeps `move_node`'s check-then-write on a consistent snapshot.

use crate::config::StoreConfig;
use crate::db::{DomainEvent, SnapshotError, SnapshotStore};
use crate::models::{DeleteResult, Node, NodeKind, ValidationError};
use crate::services::compliance::{score_nodes, ComplianceReport};
use crate::services::error::TreeStoreError;
use crate::utils::parse_listing;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast channel capacity for domain events.
///
/// Observer lag is acceptable - subscribers re-read the collection, they do
/// not replay history.
const DOMAIN_EVENT_CHANNEL_CAPACITY: usize = 128;

/// A folder with its sub-folders, for navigation trees
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderTreeNode {
    pub node: Node,
    pub children: Vec<FolderTreeNode>,
}

/// Owner of the node collection
///
/// # Examples
///
/// ```rust
/// use fairtree_core::config::StoreConfig;
/// use fairtree_core::db::MemorySnapshotStore;
/// use fairtree_core::models::NodeKind;
/// use fairtree_core::services::TreeStore;
/// use std::sync::Arc;
///
/// let mut store = TreeStore::new(StoreConfig::default(), Arc::new(MemorySnapshotStore::new()));
///
/// let data = store.create("data", NodeKind::Folder, None).unwrap();
/// let file = store.create("survey.csv", NodeKind::File, Some(&data.id)).unwrap();
///
/// let path: Vec<&str> = store
///     .resolve_path(Some(&file.id))
///     .iter()
///     .map(|n| n.name.as_str())
///     .collect();
/// assert_eq!(path, vec!["data", "survey.csv"]);
///
/// // A folder cannot be moved beneath its own contents
/// assert!(store.move_node(&data.id, Some(&file.id)).is_err());
/// ```
pub struct TreeStore {
    nodes: Vec<Node>,

    /// id -> position in `nodes`
    index: HashMap<String, usize>,

    config: StoreConfig,

    /// Receives the full collection after every mutation
    snapshots: Arc<dyn SnapshotStore>,

    /// Broadcast channel for domain events (128 subscriber capacity)
    event_tx: broadcast::Sender<DomainEvent>,

    /// Failure of the most recent snapshot save, cleared by the next success
    publish_error: Option<SnapshotError>,
}

impl std::fmt::Debug for TreeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeStore")
            .field("nodes", &self.nodes.len())
            .field("config", &self.config)
            .finish()
    }
}

impl TreeStore {
    /// Create a store with an empty collection
    pub fn new(config: StoreConfig, snapshots: Arc<dyn SnapshotStore>) -> Self {
        let (event_tx, _) = broadcast::channel(DOMAIN_EVENT_CHANNEL_CAPACITY);

        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            config,
            snapshots,
            event_tx,
            publish_error: None,
        }
    }

    /// Create a store over an existing collection
    ///
    /// # Errors
    ///
    /// Returns `CorruptCollection` if ids repeat, a node is structurally
    /// invalid, the parent links contain a cycle, or (with `verify_parents`)
    /// a node sits beneath a file.
    pub fn with_nodes(
        config: StoreConfig,
        snapshots: Arc<dyn SnapshotStore>,
        nodes: Vec<Node>,
    ) -> Result<Self, TreeStoreError> {
        validate_collection(&nodes, &config)?;

        let mut store = Self::new(config, snapshots);
        store.nodes = nodes;
        store.rebuild_index();
        Ok(store)
    }

    /// Open the persisted collection, seeding from `seed_listing` on first launch
    ///
    /// A freshly seeded collection is persisted immediately.
    pub fn open(
        config: StoreConfig,
        snapshots: Arc<dyn SnapshotStore>,
        seed_listing: &str,
    ) -> Result<Self, TreeStoreError> {
        match snapshots.load()? {
            Some(nodes) => {
                tracing::info!("Loaded snapshot with {} nodes", nodes.len());
                Self::with_nodes(config, snapshots, nodes)
            }
            None => {
                let nodes = parse_listing(seed_listing);
                tracing::info!("No snapshot found, seeded {} nodes from listing", nodes.len());
                let mut store = Self::with_nodes(config, snapshots, nodes)?;
                store.publish_snapshot();
                Ok(store)
            }
        }
    }

    /// Subscribe to domain events
    ///
    /// Single-threaded hosts drain the receiver with `try_recv()` after each call.
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    /// Emit a domain event to all subscribers
    ///
    /// Ignores errors if no subscribers.
    fn emit_event(&self, event: DomainEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Hand the current collection to the snapshot store
    ///
    /// The in-memory collection stays canonical: a failed save does not fail
    /// the mutation. It is logged and kept for `take_publish_error` until the
    /// next successful save replaces it.
    fn publish_snapshot(&mut self) {
        match self.snapshots.save(&self.nodes) {
            Ok(()) => self.publish_error = None,
            Err(e) => {
                tracing::warn!("Failed to persist snapshot of {} nodes: {}", self.nodes.len(), e);
                self.publish_error = Some(e);
            }
        }
    }

    /// Take the error of the last snapshot save, if it failed
    ///
    /// Hosts that exit after a single mutation check this before reporting
    /// success, since no later save will supersede the failed one.
    pub fn take_publish_error(&mut self) -> Option<SnapshotError> {
        self.publish_error.take()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All nodes in collection (insertion) order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Owned copy of the collection, as handed to the snapshot store
    pub fn snapshot(&self) -> Vec<Node> {
        self.nodes.clone()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct children of `parent_id` (`None` for root level), in insertion order
    pub fn children_of(&self, parent_id: Option<&str>) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.parent_id.as_deref() == parent_id)
            .collect()
    }

    /// The containing node, `None` at root level or for unknown ids
    pub fn parent_of(&self, id: &str) -> Option<&Node> {
        self.get(id)
            .and_then(|node| node.parent_id.as_deref())
            .and_then(|parent_id| self.get(parent_id))
    }

    /// Every folder in insertion order
    pub fn folders(&self) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.is_folder()).collect()
    }

    /// Breadcrumb from root level down to and including `id`
    ///
    /// Returns an empty path for the root sentinel (`None`) or an unknown id.
    /// A chain whose parent is missing stops at the break point; the walk is
    /// bounded by the collection size so it always terminates.
    pub fn resolve_path(&self, id: Option<&str>) -> Vec<&Node> {
        let mut path = Vec::new();
        let mut current = id.and_then(|id| self.get(id));

        while let Some(node) = current {
            if path.len() >= self.nodes.len() {
                tracing::warn!("Parent chain of {:?} does not terminate", id);
                break;
            }
            path.push(node);
            current = node.parent_id.as_deref().and_then(|p| self.get(p));
        }

        path.reverse();
        path
    }

    /// Check if `potential_descendant` lies in the subtree of `node_id`
    ///
    /// Walks up from `potential_descendant` through parent links until root
    /// level or `node_id` is reached. A node counts as within its own subtree.
    pub fn is_descendant(&self, node_id: &str, potential_descendant: &str) -> bool {
        let mut current = Some(potential_descendant);

        // Bounded so a corrupt chain cannot spin forever
        for _ in 0..=self.nodes.len() {
            match current {
                Some(id) if id == node_id => return true,
                Some(id) => current = self.get(id).and_then(|n| n.parent_id.as_deref()),
                None => return false,
            }
        }

        false
    }

    /// All descendants of `id` (excluding `id`), breadth-first
    pub fn descendants_of(&self, id: &str) -> Vec<&Node> {
        let children = self.child_index();
        let mut visited: HashSet<&str> = HashSet::from([id]);
        let mut queue: VecDeque<&str> = VecDeque::from([id]);
        let mut descendants = Vec::new();

        while let Some(current) = queue.pop_front() {
            for &child in children.get(current).into_iter().flatten() {
                let node = &self.nodes[child];
                if visited.insert(node.id.as_str()) {
                    descendants.push(node);
                    queue.push_back(node.id.as_str());
                }
            }
        }

        descendants
    }

    /// Nested forest of folders, rooted at the root-level folders
    pub fn folder_tree(&self) -> Vec<FolderTreeNode> {
        let children = self.child_index();
        let mut visited = HashSet::new();

        self.nodes
            .iter()
            .filter(|n| n.is_folder() && n.is_root_level())
            .map(|n| self.build_folder_tree(n, &children, &mut visited))
            .collect()
    }

    fn build_folder_tree<'a>(
        &'a self,
        node: &'a Node,
        children: &HashMap<&'a str, Vec<usize>>,
        visited: &mut HashSet<&'a str>,
    ) -> FolderTreeNode {
        visited.insert(node.id.as_str());

        let mut sub_folders = Vec::new();
        for &child in children.get(node.id.as_str()).into_iter().flatten() {
            let child = &self.nodes[child];
            if child.is_folder() && !visited.contains(child.id.as_str()) {
                sub_folders.push(self.build_folder_tree(child, children, visited));
            }
        }

        FolderTreeNode {
            node: node.clone(),
            children: sub_folders,
        }
    }

    /// Locate a node by its `/`-separated name chain from root level
    ///
    /// Sibling names are not unique; the first match in insertion order
    /// whose remaining segments also resolve wins. A leading `~/` or `/` is
    /// ignored. An empty path matches nothing.
    pub fn find_by_path(&self, path: &str) -> Option<&Node> {
        let trimmed = path.trim();
        let trimmed = trimmed.strip_prefix("~/").unwrap_or(trimmed);
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        if segments.is_empty() {
            return None;
        }
        self.find_in(None, &segments)
    }

    fn find_in(&self, parent_id: Option<&str>, segments: &[&str]) -> Option<&Node> {
        let (first, rest) = segments.split_first()?;

        for child in self.children_of(parent_id) {
            if child.name != *first {
                continue;
            }
            if rest.is_empty() {
                return Some(child);
            }
            if let Some(found) = self.find_in(Some(&child.id), rest) {
                return Some(found);
            }
        }

        None
    }

    /// Score the current collection
    pub fn compliance_report(&self) -> ComplianceReport {
        score_nodes(&self.nodes)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create a node under `parent_id` (`None` for root level)
    ///
    /// # Errors
    ///
    /// - `ValidationFailed(EmptyName)` for blank names when `reject_blank_names` is set
    /// - `InvalidParent` / `ParentNotFolder` when `verify_parents` is set
    pub fn create(
        &mut self,
        name: &str,
        kind: NodeKind,
        parent_id: Option<&str>,
    ) -> Result<Node, TreeStoreError> {
        self.check_name(name)?;
        self.check_parent(parent_id)?;

        let node = Node::new(name, kind, parent_id.map(str::to_string));
        self.insert(node.clone());

        tracing::debug!("Created {} '{}' ({})", node.kind, node.name, node.id);
        self.publish_snapshot();
        self.emit_event(DomainEvent::NodeCreated(node.clone()));
        Ok(node)
    }

    pub fn create_folder(
        &mut self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<Node, TreeStoreError> {
        self.create(name, NodeKind::Folder, parent_id)
    }

    pub fn create_file(
        &mut self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<Node, TreeStoreError> {
        self.create(name, NodeKind::File, parent_id)
    }

    /// Rename a node in place; no other attribute changes
    pub fn rename(&mut self, id: &str, new_name: &str) -> Result<Node, TreeStoreError> {
        self.check_name(new_name)?;
        let position = *self
            .index
            .get(id)
            .ok_or_else(|| TreeStoreError::node_not_found(id))?;

        let node = &mut self.nodes[position];
        node.name = new_name.to_string();
        let renamed = node.clone();

        tracing::debug!("Renamed {} to '{}'", id, new_name);
        self.publish_snapshot();
        self.emit_event(DomainEvent::NodeUpdated(renamed.clone()));
        Ok(renamed)
    }

    /// Delete a node together with its whole subtree
    ///
    /// Idempotent: an unknown id leaves the collection unchanged and returns
    /// `existed = false`.
    pub fn delete(&mut self, id: &str) -> DeleteResult {
        if !self.contains(id) {
            tracing::debug!("Delete of unknown node {} ignored", id);
            return DeleteResult::not_found();
        }

        let mut doomed: HashSet<String> = self
            .descendants_of(id)
            .into_iter()
            .map(|n| n.id.clone())
            .collect();
        doomed.insert(id.to_string());

        let removed_ids: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| doomed.contains(&n.id))
            .map(|n| n.id.clone())
            .collect();

        self.nodes.retain(|n| !doomed.contains(&n.id));
        self.rebuild_index();

        tracing::debug!("Deleted {} and {} descendants", id, removed_ids.len() - 1);
        self.publish_snapshot();
        self.emit_event(DomainEvent::NodesDeleted {
            ids: removed_ids.clone(),
        });
        DeleteResult::removed(removed_ids)
    }

    /// Re-parent a node
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if `id` does not exist
    /// - `InvalidMove` if `new_parent_id` is `id` itself or one of its descendants
    /// - `InvalidParent` / `ParentNotFolder` when `verify_parents` is set
    ///
    /// Moving a node to its current parent is a no-op.
    pub fn move_node(
        &mut self,
        id: &str,
        new_parent_id: Option<&str>,
    ) -> Result<(), TreeStoreError> {
        let position = *self
            .index
            .get(id)
            .ok_or_else(|| TreeStoreError::node_not_found(id))?;

        if let Some(parent_id) = new_parent_id {
            if parent_id == id {
                tracing::warn!("Rejected move of {} into itself", id);
                return Err(TreeStoreError::invalid_move(format!(
                    "Cannot move node {} into itself",
                    id
                )));
            }

            // Check for circular reference - parent_id cannot be a descendant of id
            if self.is_descendant(id, parent_id) {
                tracing::warn!("Rejected move of {} under its descendant {}", id, parent_id);
                return Err(TreeStoreError::invalid_move(format!(
                    "Cannot move node {} under its descendant {}",
                    id, parent_id
                )));
            }
        }
        self.check_parent(new_parent_id)?;

        let old_parent_id = self.nodes[position].parent_id.clone();
        if old_parent_id.as_deref() == new_parent_id {
            return Ok(());
        }

        self.nodes[position].parent_id = new_parent_id.map(str::to_string);

        tracing::debug!("Moved {} from {:?} to {:?}", id, old_parent_id, new_parent_id);
        self.publish_snapshot();
        self.emit_event(DomainEvent::NodeMoved {
            id: id.to_string(),
            old_parent_id,
            new_parent_id: new_parent_id.map(str::to_string),
        });
        Ok(())
    }

    /// Shallow-copy a node into `destination_parent_id`
    ///
    /// The copy is named `"<name> (Copy)"`; a folder's children are not copied.
    pub fn copy(
        &mut self,
        id: &str,
        destination_parent_id: Option<&str>,
    ) -> Result<Node, TreeStoreError> {
        let source = self
            .get(id)
            .ok_or_else(|| TreeStoreError::node_not_found(id))?;
        let copy = source.duplicate(destination_parent_id.map(str::to_string));
        self.check_parent(destination_parent_id)?;

        self.insert(copy.clone());

        tracing::debug!("Copied {} to {} as '{}'", id, copy.id, copy.name);
        self.publish_snapshot();
        self.emit_event(DomainEvent::NodeCreated(copy.clone()));
        Ok(copy)
    }

    /// Discard the collection and re-seed it from `seed_listing`
    ///
    /// `confirm` is asked first; when it declines nothing happens and
    /// `Ok(false)` is returned. The persisted snapshot is cleared before the
    /// collection is replaced, so a failure to clear leaves everything intact.
    pub fn reset<F>(&mut self, confirm: F, seed_listing: &str) -> Result<bool, TreeStoreError>
    where
        F: FnOnce() -> bool,
    {
        if !confirm() {
            tracing::info!("Reset cancelled by caller");
            return Ok(false);
        }

        let nodes = parse_listing(seed_listing);
        validate_collection(&nodes, &self.config)?;
        self.snapshots.clear()?;

        self.nodes = nodes;
        self.rebuild_index();

        tracing::info!("Reset collection to {} seeded nodes", self.nodes.len());
        self.publish_snapshot();
        self.emit_event(DomainEvent::CollectionReset {
            node_count: self.nodes.len(),
        });
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn insert(&mut self, node: Node) {
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
    }

    /// Adjacency list: parent id -> child positions in insertion order
    fn child_index(&self) -> HashMap<&str, Vec<usize>> {
        let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(parent_id) = node.parent_id.as_deref() {
                children.entry(parent_id).or_default().push(i);
            }
        }
        children
    }

    fn check_name(&self, name: &str) -> Result<(), TreeStoreError> {
        if self.config.reject_blank_names && name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }

    fn check_parent(&self, parent_id: Option<&str>) -> Result<(), TreeStoreError> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };

        match self.get(parent_id) {
            None if self.config.verify_parents => Err(TreeStoreError::invalid_parent(parent_id)),
            None => {
                tracing::warn!("Accepting unknown parent {} (parent verification off)", parent_id);
                Ok(())
            }
            Some(parent) if parent.is_file() && self.config.verify_parents => {
                Err(TreeStoreError::parent_not_folder(parent_id))
            }
            Some(_) => Ok(()),
        }
    }
}

/// Check the structural invariants of a whole collection
///
/// Ids must be unique, every node must validate, and following parent links
/// from any node must reach root level or a missing parent within
/// `nodes.len()` steps. With `verify_parents` set, a parent that is present
/// must also be a folder; missing parents are tolerated either way.
pub fn validate_collection(nodes: &[Node], config: &StoreConfig) -> Result<(), TreeStoreError> {
    let mut parents: HashMap<&str, Option<&str>> = HashMap::with_capacity(nodes.len());
    let mut kinds: HashMap<&str, NodeKind> = HashMap::with_capacity(nodes.len());

    for node in nodes {
        node.validate().map_err(|e| {
            TreeStoreError::corrupt_collection(format!("node {}: {}", node.id, e))
        })?;

        if parents
            .insert(node.id.as_str(), node.parent_id.as_deref())
            .is_some()
        {
            return Err(TreeStoreError::corrupt_collection(
                ValidationError::DuplicateId(node.id.clone()).to_string(),
            ));
        }
        kinds.insert(node.id.as_str(), node.kind);
    }

    for node in nodes {
        if config.verify_parents {
            let parent_kind = node.parent_id.as_deref().and_then(|p| kinds.get(p));
            if parent_kind == Some(&NodeKind::File) {
                return Err(TreeStoreError::corrupt_collection(format!(
                    "node {} is a child of a file",
                    node.id
                )));
            }
        }

        let mut current = node.parent_id.as_deref();
        let mut steps = 0;

        while let Some(id) = current {
            if steps >= nodes.len() {
                return Err(TreeStoreError::corrupt_collection(format!(
                    "parent chain of {} contains a cycle",
                    node.id
                )));
            }
            current = parents.get(id).copied().flatten();
            steps += 1;
        }
    }

    Ok(())
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "tree_store_test.rs"]
mod tree_store_test;
