//! Configuration
//!
//! `FairtreeConfig` is what a host persists between launches: where the
//! snapshot lives, which listing seeds a fresh collection, how strict the
//! tree store is and how the collection is displayed.
//!
//! All fields use `#[serde(default)]` so an older config file without newer
//! fields still deserializes. Environment variables override file values:
//!
//! - `FAIRTREE_SNAPSHOT` - snapshot file path
//! - `FAIRTREE_SEED` - seed listing path

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the snapshot path
pub const SNAPSHOT_ENV_VAR: &str = "FAIRTREE_SNAPSHOT";

/// Environment variable overriding the seed listing path
pub const SEED_ENV_VAR: &str = "FAIRTREE_SEED";

const DATA_DIR: &str = ".fairtree";
const SNAPSHOT_FILE: &str = "snapshot.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Cannot determine home directory")]
    NoHomeDirectory,
}

/// Structural strictness of the tree store
///
/// The default is strict. `lenient()` reproduces the trust-the-caller
/// behaviour where blank names and dangling parents are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    /// Reject names that are empty after trimming
    #[serde(default = "default_true")]
    pub reject_blank_names: bool,

    /// Reject parents that do not exist or are files
    #[serde(default = "default_true")]
    pub verify_parents: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            reject_blank_names: true,
            verify_parents: true,
        }
    }
}

impl StoreConfig {
    pub fn lenient() -> Self {
        Self {
            reject_blank_names: false,
            verify_parents: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// How a host lays out folder contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

/// Display-related preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPreferences {
    #[serde(default)]
    pub view_mode: ViewMode,
}

/// Host configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairtreeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_listing_path: Option<PathBuf>,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub display: DisplayPreferences,
}

impl FairtreeConfig {
    /// Load config from a JSON file
    ///
    /// Returns defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config to a JSON file (write-to-temp, then rename)
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(write_err)?;
        }

        let serialized = serde_json::to_string_pretty(self)?;
        let temp = path.with_extension("json.tmp");

        fs::write(&temp, serialized).map_err(write_err)?;
        fs::rename(&temp, path).map_err(write_err)?;
        Ok(())
    }

    /// Apply `FAIRTREE_SNAPSHOT` / `FAIRTREE_SEED` overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the process environment in production)
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(SNAPSHOT_ENV_VAR).filter(|v| !v.is_empty()) {
            self.snapshot_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup(SEED_ENV_VAR).filter(|v| !v.is_empty()) {
            self.seed_listing_path = Some(PathBuf::from(path));
        }
        self
    }

    /// Resolve the snapshot path, falling back to `~/.fairtree/snapshot.json`
    pub fn resolve_snapshot_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.snapshot_path {
            return Ok(path.clone());
        }

        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(home.join(DATA_DIR).join(SNAPSHOT_FILE))
    }
}
