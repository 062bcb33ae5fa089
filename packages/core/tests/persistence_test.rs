//! Snapshot Persistence Tests
//!
//! Verifies that a tree store backed by `JsonFileSnapshotStore` survives a
//! restart: the collection reloaded from disk is identical to the one that
//! was saved, and reset discards the file before re-seeding.

#[cfg(test)]
mod persistence_tests {
    use anyhow::Result;
    use fairtree_core::config::StoreConfig;
    use fairtree_core::db::{JsonFileSnapshotStore, SnapshotStore};
    use fairtree_core::services::TreeStore;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    const SEED: &str = "~/data/a.csv\n~/data/b.csv\n~/README.md\n";

    fn open_at(dir: &TempDir) -> Result<(TreeStore, Arc<JsonFileSnapshotStore>)> {
        let snapshots = Arc::new(JsonFileSnapshotStore::new(dir.path().join("snapshot.json")));
        let store = TreeStore::open(StoreConfig::default(), snapshots.clone(), SEED)?;
        Ok((store, snapshots))
    }

    #[test]
    fn test_first_open_writes_seed_to_disk() -> Result<()> {
        let temp = TempDir::new()?;
        let (store, snapshots) = open_at(&temp)?;

        assert!(snapshots.path().exists());
        assert_eq!(snapshots.load()?, Some(store.snapshot()));
        Ok(())
    }

    #[test]
    fn test_restart_round_trip() -> Result<()> {
        let temp = TempDir::new()?;

        let saved = {
            let (mut store, _) = open_at(&temp)?;
            let data = store
                .find_by_path("data")
                .map(|n| n.id.clone())
                .ok_or_else(|| anyhow::anyhow!("seed folder missing"))?;
            let nested = store.create_folder("nested", Some(&data))?;
            store.create_file("c_2024-01-31.csv", Some(&nested.id))?;
            store.snapshot()
        };

        // A seed that differs proves the snapshot, not the listing, was used
        let snapshots = Arc::new(JsonFileSnapshotStore::new(temp.path().join("snapshot.json")));
        let reopened = TreeStore::open(StoreConfig::default(), snapshots, "other/seed.txt")?;

        assert_eq!(reopened.snapshot(), saved);
        assert!(reopened.find_by_path("data/nested/c_2024-01-31.csv").is_some());
        Ok(())
    }

    #[test]
    fn test_snapshot_file_is_json_array_of_records() -> Result<()> {
        let temp = TempDir::new()?;
        let (_, snapshots) = open_at(&temp)?;

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(snapshots.path())?)?;
        let records = value
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("snapshot is not an array"))?;

        assert_eq!(records.len(), 4);
        assert_eq!(records[0]["name"], "data");
        assert_eq!(records[0]["type"], "folder");
        assert!(records[0]["parentId"].is_null());
        assert!(records[0].get("content").is_none());
        assert_eq!(records[1]["type"], "file");
        assert_eq!(records[1]["content"], "");
        assert_eq!(records[1]["parentId"], records[0]["id"]);
        assert!(records[1]["createdAt"].is_i64());
        Ok(())
    }

    #[test]
    fn test_reset_replaces_file_contents() -> Result<()> {
        let temp = TempDir::new()?;
        let (mut store, snapshots) = open_at(&temp)?;
        let readme = store
            .find_by_path("README.md")
            .map(|n| n.id.clone())
            .ok_or_else(|| anyhow::anyhow!("seed file missing"))?;
        store.delete(&readme);
        assert_eq!(snapshots.load()?.map(|n| n.len()), Some(3));

        store.reset(|| true, SEED)?;

        let reloaded = snapshots.load()?.unwrap_or_default();
        assert_eq!(reloaded.len(), 4);
        assert_eq!(reloaded, store.snapshot());
        Ok(())
    }

    #[test]
    fn test_corrupt_snapshot_is_reported() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("snapshot.json");
        fs::write(&path, "[{\"id\": 1}]")?;

        let snapshots = Arc::new(JsonFileSnapshotStore::new(&path));
        let result = TreeStore::open(StoreConfig::default(), snapshots, SEED);

        assert!(result.is_err());
        Ok(())
    }
}
