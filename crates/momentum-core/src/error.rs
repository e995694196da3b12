use thiserror::Error;

/// Top-level error type for the Momentum engine.
///
/// Each variant wraps a subsystem-specific failure. The query crate defines
/// its own error type and converts in both directions so that the `?`
/// operator works seamlessly across the crate boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MomentumError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for MomentumError {
    fn from(err: toml::de::Error) -> Self {
        MomentumError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MomentumError {
    fn from(err: toml::ser::Error) -> Self {
        MomentumError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MomentumError {
    fn from(err: serde_json::Error) -> Self {
        MomentumError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Momentum operations.
pub type Result<T> = std::result::Result<T, MomentumError>;
