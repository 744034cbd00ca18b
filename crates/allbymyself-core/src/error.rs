//! Error types for allbymyself.
//!
//! Store and cache failures are wrapped but never reinterpreted: the source
//! error is kept so callers see exactly what the backend reported.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for singleton records and their admin.
#[derive(Debug, Error)]
pub enum SingletonError {
    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Cache errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Cache client is not connected")]
    CacheDisconnected,

    // Admin errors
    #[error("{model} with ID \u{201c}{object_id}\u{201d} doesn\u{2019}t exist")]
    DoesNotExist { model: String, object_id: String },

    #[error("Permission denied: cannot {action} {model}")]
    PermissionDenied { action: String, model: String },

    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for singleton operations.
pub type Result<T> = std::result::Result<T, SingletonError>;

impl From<std::io::Error> for SingletonError {
    fn from(err: std::io::Error) -> Self {
        SingletonError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for SingletonError {
    fn from(err: serde_json::Error) -> Self {
        SingletonError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for SingletonError {
    fn from(err: rusqlite::Error) -> Self {
        SingletonError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl SingletonError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        SingletonError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Error for a poisoned or otherwise unusable connection lock.
    pub(crate) fn lock(what: &str, err: impl std::fmt::Display) -> Self {
        SingletonError::Database {
            message: format!("Failed to lock {}: {}", what, err),
            source: None,
        }
    }

    /// Map to the HTTP status an admin frontend should answer with.
    ///
    /// - 400: posted data did not validate
    /// - 403: the admin refuses the action (add/delete on a singleton)
    /// - 404: the requested object does not exist
    /// - 503: the cache client was disconnected
    /// - 500: everything the store or cache backend raised
    pub fn status_code(&self) -> u16 {
        match self {
            SingletonError::Validation { .. } => 400,
            SingletonError::PermissionDenied { .. } => 403,
            SingletonError::DoesNotExist { .. } => 404,
            SingletonError::CacheDisconnected => 503,
            _ => 500,
        }
    }
}
