use std::fmt;

use sha2::{Digest as _, Sha256};

use crate::ops::parse::Operation;

/// Bumped whenever the canonical encoding below changes.
const DOMAIN: &str = "rendition/cache-key/v1";

/// Deterministic digest addressing one derived artifact.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Key for a processed rendition.
    ///
    /// Every string is length-prefixed and options are visited in sorted order, so the key only
    /// depends on the logical request shape.
    pub fn compute(project: &str, identifier: &str, stack: &[Operation], format: &str) -> Self {
        let mut h = StableHasher::new();
        h.write_str(DOMAIN);
        h.write_str("rendition");
        h.write_str(project);
        h.write_str(identifier);
        h.write_len(stack.len());
        for op in stack {
            h.write_str(&op.kind);
            h.write_len(op.options.len());
            for (k, v) in &op.options {
                h.write_str(k);
                h.write_str(v);
            }
        }
        h.write_str(format);
        h.finish()
    }

    /// Key for the metadata document of a source.
    pub fn for_info(project: &str, identifier: &str) -> Self {
        let mut h = StableHasher::new();
        h.write_str(DOMAIN);
        h.write_str("info");
        h.write_str(project);
        h.write_str(identifier);
        h.finish()
    }

    /// Lowercase hex form, used as the artifact file stem.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(self.0.len() * 2);
        for b in self.0 {
            out.push_str(&format!("{b:02x}"));
        }
        out
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({})", self.to_hex())
    }
}

struct StableHasher {
    inner: Sha256,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Sha256::new(),
        }
    }

    fn write_len(&mut self, n: usize) {
        self.inner.update((n as u64).to_le_bytes());
    }

    fn write_str(&mut self, s: &str) {
        self.write_len(s.len());
        self.inner.update(s.as_bytes());
    }

    fn finish(self) -> CacheKey {
        CacheKey(self.inner.finalize().into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/key.rs"]
mod tests;
