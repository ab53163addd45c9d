//! Cache error types.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache operation errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A value could not be encoded in the configured format.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Stored bytes could not be decoded.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Backend storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while building a cache, before any request is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An option name that the cache does not understand.
    #[error("unknown option: {name}. Valid options are: {valid}")]
    UnknownOption { name: String, valid: String },

    /// The store does not support a required operation.
    #[error("{store} is not a valid cache store as it does not support '{missing}'")]
    InvalidStore { store: String, missing: String },

    /// An option was present but its value is not acceptable.
    #[error("invalid value for option '{name}': {message}")]
    InvalidValue { name: String, message: String },

    /// The options document could not be parsed.
    #[error("failed to parse cache options: {0}")]
    Parse(String),
}
