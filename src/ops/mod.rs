/// Operation mini-language parser.
pub mod parse;
/// Typed, validated transform steps.
pub mod step;
