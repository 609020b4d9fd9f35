use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cache::key::CacheKey;
use crate::foundation::error::RenditionResult;

/// Where one artifact lives: `<root>/<project>/<identifier>/<key>.<extension>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactAddress {
    /// Project namespace.
    pub project: String,
    /// Source identifier.
    pub identifier: String,
    /// Request-shape key.
    pub key: CacheKey,
    /// File extension, the requested format token.
    pub extension: String,
}

impl ArtifactAddress {
    /// Build an address.
    pub fn new(
        project: impl Into<String>,
        identifier: impl Into<String>,
        key: CacheKey,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            identifier: identifier.into(),
            key,
            extension: extension.into(),
        }
    }
}

/// Write-once artifact store beneath a single root.
///
/// Artifacts are never rewritten in place or evicted. Content for a key is deterministic, so
/// concurrent writers racing on the same file leave identical bytes behind.
#[derive(Clone, Debug)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Store rooted at `root`. Nothing is created until the first `put`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding all artifacts of one source.
    pub fn source_dir(&self, project: &str, identifier: &str) -> PathBuf {
        self.root.join(project).join(identifier)
    }

    /// File path for `address`.
    pub fn path_for(&self, address: &ArtifactAddress) -> PathBuf {
        self.source_dir(&address.project, &address.identifier)
            .join(format!("{}.{}", address.key.to_hex(), address.extension))
    }

    /// Read an artifact; `Ok(None)` on a miss.
    pub fn get(&self, address: &ArtifactAddress) -> RenditionResult<Option<Vec<u8>>> {
        let path = self.path_for(address);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("read cached artifact '{}'", path.display()))
                .into()),
        }
    }

    /// Persist an artifact atomically.
    ///
    /// Bytes go to a temporary file in the destination directory, which is then renamed over
    /// the final path, so readers never observe a partially written artifact.
    pub fn put(&self, address: &ArtifactAddress, bytes: &[u8]) -> RenditionResult<PathBuf> {
        let path = self.path_for(address);
        let dir = self.source_dir(&address.project, &address.identifier);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create cache dir '{}'", dir.display()))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".partial-")
            .tempfile_in(&dir)
            .with_context(|| format!("create temp file in '{}'", dir.display()))?;
        tmp.write_all(bytes)
            .with_context(|| format!("write temp file for '{}'", path.display()))?;
        tmp.as_file()
            .sync_all()
            .with_context(|| format!("sync temp file for '{}'", path.display()))?;
        tmp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("persist artifact '{}'", path.display()))?;

        Ok(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/store.rs"]
mod tests;
