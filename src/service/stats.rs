use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Point-in-time snapshot of a service's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    /// Requests answered straight from the artifact cache.
    pub cache_hits: u64,
    /// Requests that found no artifact on the first lookup.
    pub cache_misses: u64,
    /// Rendition computations actually executed.
    pub transforms: u64,
    /// Requests that received bytes computed by a concurrent identical request.
    pub shared: u64,
    /// Artifacts that could not be persisted.
    pub cache_write_failures: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    transforms: AtomicU64,
    shared: AtomicU64,
    cache_write_failures: AtomicU64,
}

impl Counters {
    pub(crate) fn hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn transform(&self) {
        self.transforms.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn shared(&self) {
        self.shared.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn write_failure(&self) {
        self.cache_write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ServiceStats {
        ServiceStats {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            transforms: self.transforms.load(Ordering::Relaxed),
            shared: self.shared.load(Ordering::Relaxed),
            cache_write_failures: self.cache_write_failures.load(Ordering::Relaxed),
        }
    }
}
