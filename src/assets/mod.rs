/// Source decoding with orientation normalization.
pub mod decode;
/// Source metadata probing.
pub mod info;
/// `(project, identifier)` to source file resolution.
pub mod resolve;
