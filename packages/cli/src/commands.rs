//! CLI command definitions and dispatch.
//!
//! Every invocation opens the persisted collection (seeding it on first
//! use), applies at most one mutation and exits. Paths are `/`-separated name
//! chains from the root level; `/` or an empty string denotes the root itself.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use fairtree_core::config::{FairtreeConfig, StoreConfig};
use fairtree_core::db::JsonFileSnapshotStore;
use fairtree_core::services::TreeStore;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::output;

/// FairTree - curate a virtual file tree and score its naming conventions
#[derive(Debug, Parser)]
#[command(name = "fairtree", version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot file (overrides config and FAIRTREE_SNAPSHOT)
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Seed listing used when no snapshot exists (overrides config and FAIRTREE_SEED)
    #[arg(long, global = true)]
    pub seed: Option<PathBuf>,

    /// Accept blank names and unverified parents
    #[arg(long, global = true)]
    pub lenient: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score every name in the collection
    Score {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the whole collection as a tree
    Tree,
    /// List the contents of a folder
    Ls {
        /// Folder path (root if omitted)
        path: Option<String>,
    },
    /// Show the breadcrumb of a node with ids
    Path {
        /// Node path
        path: String,
    },
    /// Create a folder
    Mkdir {
        /// Parent folder path (`/` for root)
        parent: String,
        /// Folder name
        name: String,
    },
    /// Create an empty file
    Touch {
        /// Parent folder path (`/` for root)
        parent: String,
        /// File name
        name: String,
    },
    /// Rename a node
    Rename {
        /// Node path
        path: String,
        /// New name
        name: String,
    },
    /// Move a node into another folder
    Mv {
        /// Node path
        path: String,
        /// Destination folder path (`/` for root)
        dest: String,
    },
    /// Copy a node (children are not copied)
    Cp {
        /// Node path
        path: String,
        /// Destination folder path (`/` for root)
        dest: String,
    },
    /// Delete a node and everything below it
    Rm {
        /// Node path
        path: String,
    },
    /// Discard the collection and re-seed it
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> Result<()> {
        let base = match &self.config {
            Some(path) => FairtreeConfig::load(path)?,
            None => FairtreeConfig::default(),
        };
        let config = self.apply_flags(base.with_env_overrides());

        let seed = read_seed(config.seed_listing_path.as_deref())?;
        let snapshot_path = config.resolve_snapshot_path()?;
        tracing::debug!("Using snapshot {}", snapshot_path.display());

        let snapshots = Arc::new(JsonFileSnapshotStore::new(snapshot_path));
        let mut store = TreeStore::open(config.store, snapshots, &seed)?;
        ensure_persisted(&mut store)?;

        run(&mut store, &config, &seed, &self.command)
    }

    /// Command-line flags take precedence over file and environment values
    fn apply_flags(&self, mut config: FairtreeConfig) -> FairtreeConfig {
        if let Some(path) = &self.snapshot {
            config.snapshot_path = Some(path.clone());
        }
        if let Some(path) = &self.seed {
            config.seed_listing_path = Some(path.clone());
        }
        if self.lenient {
            config.store = StoreConfig::lenient();
        }
        config
    }
}

/// Dispatch one command against an open store
fn run(store: &mut TreeStore, config: &FairtreeConfig, seed: &str, command: &Commands) -> Result<()> {
    match command {
        Commands::Score { json } => {
            let report = store.compliance_report();
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", output::render_report(&report));
            }
        }
        Commands::Tree => print!("{}", output::render_tree(store)),
        Commands::Ls { path } => {
            let target = resolve_folder(store, path.as_deref().unwrap_or("/"))?;
            let mut nodes = store.children_of(target.as_deref());
            if let Some(node) = target.as_deref().and_then(|id| store.get(id)) {
                if node.is_file() {
                    nodes = vec![node];
                }
            }
            print!("{}", output::render_listing(&nodes, config.display.view_mode));
        }
        Commands::Path { path } => {
            let id = resolve_node(store, path)?;
            print!("{}", output::render_path(&store.resolve_path(Some(&id))));
        }
        Commands::Mkdir { parent, name } => {
            let parent = resolve_folder(store, parent)?;
            let node = store.create_folder(name, parent.as_deref())?;
            ensure_persisted(store)?;
            output::print_success(&format!("Created folder '{}' ({})", node.name, node.id));
        }
        Commands::Touch { parent, name } => {
            let parent = resolve_folder(store, parent)?;
            let node = store.create_file(name, parent.as_deref())?;
            ensure_persisted(store)?;
            output::print_success(&format!("Created file '{}' ({})", node.name, node.id));
        }
        Commands::Rename { path, name } => {
            let id = resolve_node(store, path)?;
            let node = store.rename(&id, name)?;
            ensure_persisted(store)?;
            output::print_success(&format!("Renamed to '{}'", node.name));
        }
        Commands::Mv { path, dest } => {
            let id = resolve_node(store, path)?;
            let dest_id = resolve_folder(store, dest)?;
            store.move_node(&id, dest_id.as_deref())?;
            ensure_persisted(store)?;
            output::print_success(&format!("Moved '{}' to '{}'", path, dest));
        }
        Commands::Cp { path, dest } => {
            let id = resolve_node(store, path)?;
            let dest_id = resolve_folder(store, dest)?;
            let copy = store.copy(&id, dest_id.as_deref())?;
            ensure_persisted(store)?;
            output::print_success(&format!("Copied to '{}' ({})", copy.name, copy.id));
        }
        Commands::Rm { path } => {
            let id = resolve_node(store, path)?;
            let result = store.delete(&id);
            ensure_persisted(store)?;
            output::print_success(&format!("Removed {} node(s)", result.removed_ids.len()));
        }
        Commands::Reset { yes } => {
            let confirmed = store.reset(|| *yes || confirm_reset(), seed)?;
            ensure_persisted(store)?;
            if confirmed {
                output::print_success(&format!("Collection reset to {} nodes", store.len()));
            } else {
                println!("Reset cancelled.");
            }
        }
    }
    Ok(())
}

/// Fail the command if the last mutation never reached the snapshot
///
/// The process exits right after one mutation, so a failed save would
/// otherwise be lost silently.
fn ensure_persisted(store: &mut TreeStore) -> Result<()> {
    match store.take_publish_error() {
        Some(e) => Err(e).context("Change applied in memory but not saved"),
        None => Ok(()),
    }
}

/// Seed listing text, empty when no listing is configured
fn read_seed(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed listing {}", path.display())),
        None => Ok(String::new()),
    }
}

fn is_root(path: &str) -> bool {
    matches!(path.trim(), "" | "/" | "~" | "~/")
}

/// Resolve a destination: `None` for the root level, otherwise the node id
fn resolve_folder(store: &TreeStore, path: &str) -> Result<Option<String>> {
    if is_root(path) {
        return Ok(None);
    }
    resolve_node(store, path).map(Some)
}

fn resolve_node(store: &TreeStore, path: &str) -> Result<String> {
    if is_root(path) {
        bail!("The root level is not a node");
    }
    store
        .find_by_path(path)
        .map(|node| node.id.clone())
        .ok_or_else(|| anyhow!("No node at '{}'", path))
}

fn confirm_reset() -> bool {
    print!("Discard the collection and re-seed it? [y/N] ");
    let _ = io::stdout().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairtree_core::db::{MemorySnapshotStore, SnapshotError, SnapshotStore};
    use tempfile::TempDir;

    const SEED: &str = "~/data/raw/a.csv\n~/data/b.csv\n";

    fn store() -> TreeStore {
        TreeStore::open(StoreConfig::default(), Arc::new(MemorySnapshotStore::new()), SEED).unwrap()
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("fairtree").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = parse(&["mv", "data/b.csv", "/", "--lenient", "--snapshot", "/tmp/s.json"]);
        assert!(cli.lenient);
        assert_eq!(cli.snapshot, Some(PathBuf::from("/tmp/s.json")));
        assert!(matches!(cli.command, Commands::Mv { ref dest, .. } if dest == "/"));
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&["--seed", "seed.txt", "--lenient", "tree"]);
        let base = FairtreeConfig {
            seed_listing_path: Some(PathBuf::from("other.txt")),
            ..FairtreeConfig::default()
        };

        let config = cli.apply_flags(base);
        assert_eq!(config.seed_listing_path, Some(PathBuf::from("seed.txt")));
        assert_eq!(config.store, StoreConfig::lenient());
        assert!(config.snapshot_path.is_none());
    }

    #[test]
    fn test_resolve_paths() {
        let store = store();
        assert_eq!(resolve_folder(&store, "/").unwrap(), None);
        assert_eq!(resolve_folder(&store, "").unwrap(), None);

        let raw = store.find_by_path("data/raw").unwrap().id.clone();
        assert_eq!(resolve_folder(&store, "data/raw").unwrap(), Some(raw.clone()));
        assert_eq!(resolve_node(&store, "~/data/raw/").unwrap(), raw);

        assert!(resolve_node(&store, "/").is_err());
        assert!(resolve_node(&store, "data/missing").is_err());
    }

    #[test]
    fn test_run_mutations() {
        let mut store = store();
        let config = FairtreeConfig::default();

        let mkdir = Commands::Mkdir {
            parent: "data".to_string(),
            name: "clean".to_string(),
        };
        run(&mut store, &config, SEED, &mkdir).unwrap();

        let mv = Commands::Mv {
            path: "data/b.csv".to_string(),
            dest: "data/clean".to_string(),
        };
        run(&mut store, &config, SEED, &mv).unwrap();
        assert!(store.find_by_path("data/clean/b.csv").is_some());

        let cycle = Commands::Mv {
            path: "data".to_string(),
            dest: "data/clean".to_string(),
        };
        assert!(run(&mut store, &config, SEED, &cycle).is_err());

        let rm = Commands::Rm {
            path: "data/raw".to_string(),
        };
        run(&mut store, &config, SEED, &rm).unwrap();
        assert!(store.find_by_path("data/raw/a.csv").is_none());

        let reset = Commands::Reset { yes: true };
        run(&mut store, &config, SEED, &reset).unwrap();
        assert!(store.find_by_path("data/raw/a.csv").is_some());
    }

    #[test]
    fn test_execute_persists_between_invocations() {
        let temp = TempDir::new().unwrap();
        let seed_path = temp.path().join("seed.txt");
        let snapshot_path = temp.path().join("snapshot.json");
        fs::write(&seed_path, SEED).unwrap();

        let seed_arg = seed_path.to_string_lossy().to_string();
        let snapshot_arg = snapshot_path.to_string_lossy().to_string();
        let flags = ["--seed", seed_arg.as_str(), "--snapshot", snapshot_arg.as_str()];

        let mut touch: Vec<&str> = flags.to_vec();
        touch.extend(["touch", "/", "README.md"]);
        parse(&touch).execute().unwrap();

        let saved = JsonFileSnapshotStore::new(&snapshot_path).load().unwrap().unwrap();
        assert_eq!(saved.len(), 5);
        assert!(saved.iter().any(|n| n.name == "README.md" && n.parent_id.is_none()));

        let mut rm: Vec<&str> = flags.to_vec();
        rm.extend(["rm", "README.md"]);
        parse(&rm).execute().unwrap();

        let saved = JsonFileSnapshotStore::new(&snapshot_path).load().unwrap().unwrap();
        assert_eq!(saved.len(), 4);
    }

    #[test]
    fn test_unwritable_snapshot_fails_the_command() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let snapshot_arg = blocker.join("snapshot.json").to_string_lossy().to_string();

        let cli = parse(&["--snapshot", snapshot_arg.as_str(), "mkdir", "/", "data"]);
        let err = cli.execute().expect_err("save beneath a regular file must fail");

        assert!(err.downcast_ref::<SnapshotError>().is_some());
        assert!(!blocker.join("snapshot.json").exists());
    }

    #[test]
    fn test_failed_save_after_mutation_is_reported() {
        let temp = TempDir::new().unwrap();
        let snapshot_path = temp.path().join("snapshot.json");
        let snapshots = Arc::new(JsonFileSnapshotStore::new(&snapshot_path));
        let mut store = TreeStore::open(StoreConfig::default(), snapshots, SEED).unwrap();

        // Replace the snapshot file with a directory so the rename fails
        fs::remove_file(&snapshot_path).unwrap();
        fs::create_dir(&snapshot_path).unwrap();
        fs::write(snapshot_path.join("keep"), "").unwrap();

        let touch = Commands::Touch {
            parent: "/".to_string(),
            name: "late.txt".to_string(),
        };
        assert!(run(&mut store, &FairtreeConfig::default(), SEED, &touch).is_err());
        assert!(store.find_by_path("late.txt").is_some());
    }

    #[test]
    fn test_missing_seed_file_is_an_error() {
        assert!(read_seed(Some(Path::new("/nonexistent/seed.txt"))).is_err());
        assert_eq!(read_seed(None).unwrap(), "");
    }
}
