/// Request orchestration over resolver, engine and cache.
pub mod pipeline;
/// Service counters.
pub mod stats;
