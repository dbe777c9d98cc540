//! Error types for drivebit

use thiserror::Error;

/// The main error type for drivebit operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriveError {
    /// The LMDB layer rejected a read or write
    #[error("storage error: {0}")]
    Storage(String),

    #[error("store not initialized")]
    NotInitialized,

    #[error("store already initialized at {0}")]
    AlreadyInitialized(String),

    /// The record being updated no longer exists
    #[error("update failed: item {0} does not exist")]
    UpdateFailed(u64),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unknown scope '{0}'")]
    UnknownScope(String),

    /// The viewer may not run this query
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for drivebit operations
pub type Result<T> = std::result::Result<T, DriveError>;

/// Convert any storage error to DriveError
pub fn err<E: std::error::Error>(e: E) -> DriveError {
    DriveError::Storage(e.to_string())
}

pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> DriveError {
    DriveError::InvalidField { field, reason: reason.into() }
}
