//! Walk configuration.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Default per-directory entry cap.
///
/// Entries beyond the cap are dropped and the level is flagged as
/// truncated. Bounds memory per directory listing.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Configuration for a single tree walk.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct WalkConfig {
    /// Root directory to walk.
    pub root: PathBuf,

    /// Maximum entries captured per directory level.
    #[builder(default = "DEFAULT_MAX_ENTRIES")]
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Recurse into directories reached through symlinks.
    ///
    /// Off by default; symlinks are always captured as their own entry
    /// either way, never dereferenced for metadata.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

impl WalkConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        if let Some(max_entries) = self.max_entries {
            if max_entries == 0 {
                return Err("max_entries must be at least 1".to_string());
            }
        }
        Ok(())
    }
}

impl WalkConfig {
    /// Create a new config builder.
    pub fn builder() -> WalkConfigBuilder {
        WalkConfigBuilder::default()
    }

    /// Create a config with defaults for a root path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_entries: DEFAULT_MAX_ENTRIES,
            follow_symlinks: false,
        }
    }

    /// Same configuration pointed at a different root.
    pub fn with_root(&self, root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..self.clone()
        }
    }
}
