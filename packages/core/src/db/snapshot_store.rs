//! Snapshot Stores
//!
//! A `SnapshotStore` receives the complete node collection after every
//! mutation and hands it back on the next launch. Two backends ship with the
//! crate:
//!
//! - `MemorySnapshotStore` keeps the serialized JSON text in memory
//! - `JsonFileSnapshotStore` writes a JSON array file atomically
//!
//! Both use the same record format, so a snapshot taken by one can be loaded
//! by the other.

use crate::db::SnapshotError;
use crate::models::Node;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Persistence seam for the node collection
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved collection, or `None` if nothing was saved yet
    fn load(&self) -> Result<Option<Vec<Node>>, SnapshotError>;

    /// Replace the saved collection with `nodes`
    fn save(&self, nodes: &[Node]) -> Result<(), SnapshotError>;

    /// Discard the saved collection
    fn clear(&self) -> Result<(), SnapshotError>;
}

/// Serialize a collection into the snapshot record format
pub fn encode_snapshot(nodes: &[Node]) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(nodes)?)
}

/// Parse the snapshot record format
pub fn decode_snapshot(text: &str) -> Result<Vec<Node>, SnapshotError> {
    Ok(serde_json::from_str(text)?)
}

/// In-memory snapshot store for tests and disk-less hosts
///
/// Stores the encoded text rather than the nodes so that every save and load
/// goes through the same serialization path as the file store.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshot: Mutex<Option<String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `nodes`
    pub fn with_nodes(nodes: &[Node]) -> Result<Self, SnapshotError> {
        Ok(Self {
            snapshot: Mutex::new(Some(encode_snapshot(nodes)?)),
        })
    }

    /// Raw snapshot text, if any
    pub fn raw(&self) -> Option<String> {
        self.snapshot.lock().ok().and_then(|guard| guard.clone())
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<Vec<Node>>, SnapshotError> {
        let guard = self
            .snapshot
            .lock()
            .map_err(|_| SnapshotError::unavailable("Failed to acquire lock"))?;

        guard.as_deref().map(decode_snapshot).transpose()
    }

    fn save(&self, nodes: &[Node]) -> Result<(), SnapshotError> {
        let encoded = encode_snapshot(nodes)?;
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|_| SnapshotError::unavailable("Failed to acquire lock"))?;

        *guard = Some(encoded);
        Ok(())
    }

    fn clear(&self) -> Result<(), SnapshotError> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|_| SnapshotError::unavailable("Failed to acquire lock"))?;

        *guard = None;
        Ok(())
    }
}

/// Snapshot store backed by a single JSON file
///
/// Uses atomic write pattern (write-to-temp, then rename) so a crash during
/// save never leaves a truncated snapshot behind.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileSnapshotStore {
    fn load(&self) -> Result<Option<Vec<Node>>, SnapshotError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents =
            fs::read_to_string(&self.path).map_err(|e| SnapshotError::io(&self.path, e))?;

        decode_snapshot(&contents).map(Some)
    }

    fn save(&self, nodes: &[Node]) -> Result<(), SnapshotError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| SnapshotError::io(dir, e))?;
        }

        let serialized = serde_json::to_string_pretty(nodes)?;
        let temp = self.temp_path();

        fs::write(&temp, serialized).map_err(|e| SnapshotError::io(&temp, e))?;
        fs::rename(&temp, &self.path).map_err(|e| SnapshotError::io(&self.path, e))?;

        Ok(())
    }

    fn clear(&self) -> Result<(), SnapshotError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SnapshotError::io(&self.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Vec<Node> {
        let folder = Node::new_folder("raw_data", None);
        let file = Node::new_file("a.csv", Some(folder.id.clone()));
        vec![folder, file]
    }

    #[test]
    fn test_memory_store_starts_empty() {
        let store = MemorySnapshotStore::new();
        assert!(store.load().unwrap().is_none());
        assert!(store.raw().is_none());
    }

    #[test]
    fn test_memory_store_save_load_clear() {
        let store = MemorySnapshotStore::new();
        let nodes = sample();

        store.save(&nodes).unwrap();
        assert_eq!(store.load().unwrap(), Some(nodes));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileSnapshotStore::new(temp.path().join("snapshot.json"));
        assert!(store.load().unwrap().is_none());
        // Clearing a missing snapshot is not an error
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_creates_parent_dirs_and_cleans_temp() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("snapshot.json");
        let store = JsonFileSnapshotStore::new(&path);
        let nodes = sample();

        store.save(&nodes).unwrap();

        assert!(path.exists());
        assert!(!store.temp_path().exists());
        assert_eq!(store.load().unwrap(), Some(nodes));
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("snapshot.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonFileSnapshotStore::new(&path);
        assert!(matches!(
            store.load(),
            Err(SnapshotError::Serialization(_))
        ));
    }

    #[test]
    fn test_stores_share_format() {
        let nodes = sample();
        let memory = MemorySnapshotStore::with_nodes(&nodes).unwrap();

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("snapshot.json");
        fs::write(&path, memory.raw().unwrap()).unwrap();

        let file = JsonFileSnapshotStore::new(&path);
        assert_eq!(file.load().unwrap(), Some(nodes));
    }
}
