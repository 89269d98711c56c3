//! Core error types for tendly-core.
//!
//! Validation and not-found errors abort the triggering mutation before any
//! state changes. Persistence and attestation errors are best-effort: the
//! engine logs them and keeps the in-memory state as the source of truth.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tendly-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Rejected input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Referenced record does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// Storage read/write failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Proof submission failed
    #[error("Attestation error: {0}")]
    Attestation(#[from] AttestationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Record kinds that can be looked up by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Task,
    Session,
    Post,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Task => "Task",
            EntityKind::Session => "Focus session",
            EntityKind::Post => "Post",
        };
        f.write_str(name)
    }
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty or whitespace-only
    #[error("'{field}' must not be empty")]
    EmptyField { field: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Not enough compost for a spend
    #[error("Not enough compost: need {needed}, have {available}")]
    InsufficientCompost { needed: u64, available: u64 },

    /// Archived tasks cannot change completion state
    #[error("Task {id} is archived")]
    TaskArchived { id: String },
}

impl ValidationError {
    pub fn empty(field: &str) -> Self {
        ValidationError::EmptyField {
            field: field.to_string(),
        }
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to open the backing store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Read failed
    #[error("Failed to load '{key}': {message}")]
    LoadFailed { key: String, message: String },

    /// Write failed
    #[error("Failed to save '{key}': {message}")]
    SaveFailed { key: String, message: String },

    /// Store is locked by another process
    #[error("Store is locked")]
    Locked,

    /// Schema setup failed
    #[error("Store migration failed: {0}")]
    MigrationFailed(String),

    /// Any other SQLite failure
    #[error("SQLite error: {0}")]
    Sqlite(#[source] rusqlite::Error),
}

/// Attestation-specific errors. Always non-fatal to the caller.
#[derive(Error, Debug)]
pub enum AttestationError {
    /// No attestation backend is reachable
    #[error("Attestation service unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the record
    #[error("Attestation rejected: {0}")]
    Rejected(String),

    /// Record could not be encoded
    #[error("Failed to encode attestation record: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        let locked = matches!(
            &err,
            rusqlite::Error::SqliteFailure(code, _)
                if code.code == rusqlite::ErrorCode::DatabaseLocked
                    || code.code == rusqlite::ErrorCode::DatabaseBusy
        );
        if locked {
            PersistenceError::Locked
        } else {
            PersistenceError::Sqlite(err)
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
