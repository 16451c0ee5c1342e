//! Domain errors for the sportcache request cache.

use thiserror::Error;

/// Errors raised by cache operations.
///
/// There is deliberately no "not found" variant: absence of a fresh entry is
/// reported as [`CacheLookup::Miss`](crate::domain::models::CacheLookup::Miss).
#[derive(Debug, Error)]
pub enum CacheError {
    /// The storage engine was unreachable or a query failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A value or parameter set could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The request itself is unusable (for example an empty endpoint name).
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl CacheError {
    /// Whether this error came from the storage layer.
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

pub type CacheResult<T> = Result<T, CacheError>;

impl From<sqlx::Error> for CacheError {
    fn from(err: sqlx::Error) -> Self {
        CacheError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}
