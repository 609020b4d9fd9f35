/// In-flight computation registry.
pub mod flight;
/// Deterministic cache keys.
pub mod key;
/// On-disk artifact store.
pub mod store;
