/// Step-by-step pipeline driver.
pub mod engine;
/// Alpha compositing onto an opaque background.
pub mod flatten;
/// Resize planning and resampling.
pub mod resize;
/// Lossless and free-angle rotation.
pub mod rotate;
