//! Derived image renditions.
//!
//! A request names a source (`project`, `identifier`), an operation stack in the
//! `type@key:value;...` wire format and an output format token. The stack is parsed and planned
//! up front, the source is decoded and orientation-normalized, the steps run in order and the
//! encoded result is stored under a key derived from the request shape, so identical requests
//! are computed once.
#![forbid(unsafe_code)]

pub mod assets;
pub mod cache;
pub mod encode;
pub mod foundation;
pub mod ops;
pub mod service;
pub mod transform;

pub use assets::decode::{DecodedSource, SourceFormat, decode_source};
pub use assets::info::{ImageInfo, probe_info};
pub use assets::resolve::{AssetReference, AssetResolver};
pub use cache::flight::{FlightRegistry, FlightRole};
pub use cache::key::CacheKey;
pub use cache::store::{ArtifactAddress, CacheStore};
pub use encode::format::{OutputFormat, encode};
pub use foundation::config::{DEFAULT_SOURCE_LEAF, ServiceConfig};
pub use foundation::error::{ErrorKind, RenditionError, RenditionResult};
pub use ops::parse::{Operation, OperationStack, parse_stack};
pub use ops::step::{Fit, Rgb, Step, plan_steps};
pub use service::pipeline::{Origin, Rendition, RenditionService};
pub use service::stats::ServiceStats;
pub use transform::engine::{apply, apply_steps};

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
mod test_support;
