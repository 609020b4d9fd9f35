use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{RenditionError, RenditionResult};

/// Default leaf name of the canonical source file inside an identifier directory.
pub const DEFAULT_SOURCE_LEAF: &str = "file";

/// Explicit configuration for a [`crate::RenditionService`].
///
/// Values are read once at construction and handed to the resolver and the cache store, so
/// several isolated services can coexist in one process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Root directory holding `<project>/<identifier>/<source_leaf>` source files.
    pub upload_root: PathBuf,
    /// Root directory for derived artifacts.
    pub cache_root: PathBuf,
    /// Leaf name of the canonical source file.
    #[serde(default = "default_source_leaf")]
    pub source_leaf: String,
    /// Worker threads for decode/transform/encode. `None` uses rayon's default.
    #[serde(default)]
    pub threads: Option<usize>,
}

fn default_source_leaf() -> String {
    DEFAULT_SOURCE_LEAF.to_string()
}

impl ServiceConfig {
    /// Build a config with default leaf name and thread count.
    pub fn new(upload_root: impl Into<PathBuf>, cache_root: impl Into<PathBuf>) -> Self {
        Self {
            upload_root: upload_root.into(),
            cache_root: cache_root.into(),
            source_leaf: default_source_leaf(),
            threads: None,
        }
    }

    /// Override the worker thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Load a config from a JSON file and validate it.
    pub fn from_json_file(path: &Path) -> RenditionResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&raw)
            .map_err(|e| RenditionError::config(format!("parse '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> RenditionResult<()> {
        if self.upload_root.as_os_str().is_empty() {
            return Err(RenditionError::config("upload_root must be non-empty"));
        }
        if self.cache_root.as_os_str().is_empty() {
            return Err(RenditionError::config("cache_root must be non-empty"));
        }
        if self.threads == Some(0) {
            return Err(RenditionError::config("threads must be >= 1"));
        }
        let leaf = self.source_leaf.as_str();
        if leaf.is_empty() || leaf == "." || leaf == ".." || leaf.contains(['/', '\\']) {
            return Err(RenditionError::config(format!(
                "source_leaf '{leaf}' must be a single file name"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
