use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;

use crate::assets::info::{ImageInfo, probe_info};
use crate::assets::resolve::{AssetReference, AssetResolver};
use crate::cache::flight::{FlightRegistry, FlightRole};
use crate::cache::key::CacheKey;
use crate::cache::store::{ArtifactAddress, CacheStore};
use crate::encode::format::OutputFormat;
use crate::foundation::config::ServiceConfig;
use crate::foundation::error::{RenditionError, RenditionResult};
use crate::ops::parse::{Operation, parse_stack};
use crate::ops::step::plan_steps;
use crate::service::stats::{Counters, ServiceStats};
use crate::transform::engine::apply_steps;

const INFO_EXTENSION: &str = "json";

/// Where the bytes of a [`Rendition`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Read back from the artifact cache.
    CacheHit,
    /// Computed by this request.
    Computed,
    /// Computed by a concurrent identical request and handed over.
    Shared,
}

/// Encoded output of one request.
#[derive(Clone, Debug)]
pub struct Rendition {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Output encoding.
    pub format: OutputFormat,
    /// How the bytes were obtained.
    pub origin: Origin,
}

impl Rendition {
    /// MIME type of [`Rendition::bytes`].
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Serves derived renditions of uploaded sources, computing each request shape at most once.
///
/// The service is `Sync`; share it behind an `Arc` and call it from as many threads as needed.
/// Decode, transform and encode run on the service's own worker pool while the calling thread
/// waits.
pub struct RenditionService {
    config: ServiceConfig,
    resolver: AssetResolver,
    store: CacheStore,
    flights: FlightRegistry<CacheKey>,
    pool: rayon::ThreadPool,
    counters: Counters,
}

impl std::fmt::Debug for RenditionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenditionService")
            .field("config", &self.config)
            .field("workers", &self.pool.current_num_threads())
            .finish_non_exhaustive()
    }
}

impl RenditionService {
    /// Validate `config` and set up the resolver, cache store and worker pool.
    pub fn new(config: ServiceConfig) -> RenditionResult<Self> {
        config.validate()?;
        let pool = build_thread_pool(config.threads)?;
        Ok(Self {
            resolver: AssetResolver::new(&config.upload_root, &config.source_leaf),
            store: CacheStore::new(&config.cache_root),
            flights: FlightRegistry::new(),
            pool,
            counters: Counters::default(),
            config,
        })
    }

    /// Configuration the service was built with.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Source resolver.
    pub fn resolver(&self) -> &AssetResolver {
        &self.resolver
    }

    /// Artifact store.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Counter snapshot.
    pub fn stats(&self) -> ServiceStats {
        self.counters.snapshot()
    }

    /// Rendition of `project/identifier` for a wire-format operation stack and format token.
    #[tracing::instrument(skip(self))]
    pub fn get_processed(
        &self,
        project: &str,
        identifier: &str,
        raw_ops: &str,
        format: &str,
    ) -> RenditionResult<Rendition> {
        let stack = parse_stack(raw_ops)?;
        self.get_processed_stack(project, identifier, &stack, format)
    }

    /// Rendition of `project/identifier` for an already parsed stack.
    ///
    /// The stack, the format token and the reference are all validated before the cache or the
    /// upload root is touched.
    #[tracing::instrument(skip(self, stack), fields(ops = stack.len()))]
    pub fn get_processed_stack(
        &self,
        project: &str,
        identifier: &str,
        stack: &[Operation],
        format: &str,
    ) -> RenditionResult<Rendition> {
        let steps = plan_steps(stack)?;
        let output = OutputFormat::from_token(format)?;
        let reference = AssetReference::new(project, identifier);
        reference.validate()?;

        let key = CacheKey::compute(project, identifier, stack, format);
        let address = ArtifactAddress::new(project, identifier, key, format);

        if let Some(bytes) = self.cached(&address) {
            self.counters.hit();
            tracing::debug!(%key, bytes = bytes.len(), "cache hit");
            return Ok(Rendition {
                bytes,
                format: output,
                origin: Origin::CacheHit,
            });
        }
        self.counters.miss();
        tracing::debug!(%key, "cache miss");

        let mut rechecked = false;
        let (bytes, role) = self.flights.run(&key, || {
            // An earlier leader may have persisted the artifact after our first lookup.
            if let Some(bytes) = self.cached(&address) {
                rechecked = true;
                return Ok(bytes);
            }
            let bytes = self.fill(&reference, &address, |source| {
                apply_steps(source, &steps, output)
            })?;
            self.counters.transform();
            Ok(bytes)
        })?;

        let origin = match role {
            FlightRole::Follower => {
                self.counters.shared();
                Origin::Shared
            }
            FlightRole::Leader if rechecked => Origin::CacheHit,
            FlightRole::Leader => Origin::Computed,
        };
        Ok(Rendition {
            bytes: unshare(bytes),
            format: output,
            origin,
        })
    }

    /// Metadata of the source behind `project/identifier`, cached as a JSON document.
    #[tracing::instrument(skip(self))]
    pub fn get_info(&self, project: &str, identifier: &str) -> RenditionResult<ImageInfo> {
        let reference = AssetReference::new(project, identifier);
        reference.validate()?;

        let key = CacheKey::for_info(project, identifier);
        let address = ArtifactAddress::new(project, identifier, key, INFO_EXTENSION);

        if let Some(bytes) = self.cached(&address) {
            match serde_json::from_slice::<ImageInfo>(&bytes) {
                Ok(info) => {
                    self.counters.hit();
                    tracing::debug!(%key, "info cache hit");
                    return Ok(info);
                }
                Err(e) => tracing::warn!(%key, error = %e, "ignoring unreadable cached info"),
            }
        }
        self.counters.miss();

        let (bytes, role) = self.flights.run(&key, || {
            self.fill(&reference, &address, |source| {
                let info = probe_info(source)?;
                Ok(serde_json::to_vec_pretty(&info).context("serialize image info")?)
            })
        })?;
        if role == FlightRole::Follower {
            self.counters.shared();
        }

        let info = serde_json::from_slice(&bytes).context("decode image info document")?;
        Ok(info)
    }

    /// Read the source, produce the artifact on the worker pool and persist it best-effort.
    fn fill<F>(
        &self,
        reference: &AssetReference,
        address: &ArtifactAddress,
        produce: F,
    ) -> RenditionResult<Vec<u8>>
    where
        F: FnOnce(&[u8]) -> RenditionResult<Vec<u8>> + Send,
    {
        let source = self.resolver.read(reference)?;
        let started = Instant::now();
        let bytes = self.pool.install(|| produce(&source))?;
        tracing::info!(
            key = %address.key,
            project = %address.project,
            identifier = %address.identifier,
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "computed artifact"
        );
        self.persist(address, &bytes);
        Ok(bytes)
    }

    /// Cache lookup; read errors degrade to a miss.
    fn cached(&self, address: &ArtifactAddress) -> Option<Vec<u8>> {
        match self.store.get(address) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(
                    path = %self.store.path_for(address).display(),
                    error = %e,
                    "cache read failed, treating as miss"
                );
                None
            }
        }
    }

    fn persist(&self, address: &ArtifactAddress, bytes: &[u8]) {
        if let Err(e) = self.store.put(address, bytes) {
            self.counters.write_failure();
            tracing::warn!(
                path = %self.store.path_for(address).display(),
                error = %e,
                "failed to persist artifact"
            );
        }
    }
}

fn unshare(bytes: Arc<Vec<u8>>) -> Vec<u8> {
    Arc::try_unwrap(bytes).unwrap_or_else(|shared| shared.as_ref().clone())
}

fn build_thread_pool(threads: Option<usize>) -> RenditionResult<rayon::ThreadPool> {
    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("rendition-worker-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| RenditionError::config(format!("failed to build worker pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/service/pipeline.rs"]
mod tests;
