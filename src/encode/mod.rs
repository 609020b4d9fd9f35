/// Output format allow-list and encoders.
pub mod format;
