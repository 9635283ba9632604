//! Crate-wide result alias

/// Result type used throughout the stilt engine
pub type Result<T> = std::result::Result<T, crate::error::StiltError>;
