use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{RenditionError, RenditionResult};

/// Address of one canonical source file inside a project namespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetReference {
    /// Project namespace.
    pub project: String,
    /// Opaque identifier (content hash upstream).
    pub identifier: String,
}

impl AssetReference {
    /// Build a reference.
    pub fn new(project: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            identifier: identifier.into(),
        }
    }

    /// Check that both parts are plain path segments.
    pub fn validate(&self) -> RenditionResult<()> {
        let id = self.identifier.as_str();
        check_segment(&self.project, id, "project")?;
        check_segment(id, id, "identifier")
    }
}

/// Reject anything that is not a single, plain path segment.
///
/// Empty values, `.`/`..` and values containing separators cannot name an asset, so they are
/// reported as missing rather than joined onto a root.
fn check_segment(value: &str, identifier: &str, what: &str) -> RenditionResult<()> {
    let bad = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);
    if bad {
        return Err(RenditionError::not_found(
            identifier,
            format!("{what} '{value}' is not a valid path segment"),
        ));
    }
    Ok(())
}

/// Read-only resolver over the upload root.
#[derive(Clone, Debug)]
pub struct AssetResolver {
    upload_root: PathBuf,
    source_leaf: String,
}

impl AssetResolver {
    /// Resolver over `upload_root`, looking for `source_leaf` inside each identifier directory.
    pub fn new(upload_root: impl Into<PathBuf>, source_leaf: impl Into<String>) -> Self {
        Self {
            upload_root: upload_root.into(),
            source_leaf: source_leaf.into(),
        }
    }

    /// Upload root this resolver reads from.
    pub fn root(&self) -> &Path {
        &self.upload_root
    }

    /// Canonical source path for `reference`.
    ///
    /// Fails with `NotFound` when the identifier directory or the source file is absent.
    pub fn resolve(&self, reference: &AssetReference) -> RenditionResult<PathBuf> {
        reference.validate()?;
        let id = reference.identifier.as_str();

        let dir = self.upload_root.join(&reference.project).join(id);
        if !dir.is_dir() {
            return Err(RenditionError::not_found(
                id,
                format!("can't find identifier directory {}", dir.display()),
            ));
        }

        let path = dir.join(&self.source_leaf);
        if !path.is_file() {
            return Err(RenditionError::not_found(
                id,
                format!("can't find source file {}", path.display()),
            ));
        }

        Ok(path)
    }

    /// Resolve and read the source bytes.
    pub fn read(&self, reference: &AssetReference) -> RenditionResult<Vec<u8>> {
        let path = self.resolve(reference)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            // Removed between the existence check and the read.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RenditionError::not_found(
                &reference.identifier,
                format!("source file {} disappeared", path.display()),
            )),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("read source '{}'", path.display()))
                .into()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolve.rs"]
mod tests;
