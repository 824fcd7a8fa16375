//! Error types for fleetlog.
//!
//! Every fallible operation in the crate returns [`Error`]. The variants are
//! grouped the way callers react to them: validation errors block a form,
//! write errors are reported while the stored state stays untouched, and
//! nothing here is fatal to the process.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::Collection;

/// The main error type for fleetlog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A write would push the stored values past the configured quota.
    #[error("storage quota exceeded writing '{key}': {required} bytes needed, quota is {quota}")]
    QuotaExceeded {
        /// Storage key being written.
        key: String,
        /// Total bytes the storage would hold after the write.
        required: u64,
        /// Configured quota in bytes.
        quota: u64,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Validation Errors ===
    /// A submitted form field is missing or malformed.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// User-facing description of the problem.
        message: String,
    },

    // === Entity Errors ===
    /// No record with the given id exists in the collection.
    #[error("no record with id '{id}' in {collection}")]
    NotFound {
        /// Collection that was searched.
        collection: Collection,
        /// The id that was looked up.
        id: String,
    },

    /// The stored collection holds records that cannot be read.
    ///
    /// Writes that start from the stored records are refused so that the
    /// unreadable ones are not overwritten.
    #[error("stored {collection} cannot be read: {message}")]
    MalformedCollection {
        /// Collection whose stored value failed to parse.
        collection: Collection,
        /// What failed to parse.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for fleetlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a validation error for a form field.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a not-found error.
    #[must_use]
    pub fn not_found(collection: Collection, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }

    /// Create a malformed-collection error.
    #[must_use]
    pub fn malformed(collection: Collection, message: impl Into<String>) -> Self {
        Self::MalformedCollection {
            collection,
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error came from form validation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error means a write did not reach storage.
    ///
    /// The stored value for the key is unchanged when this returns `true`.
    #[must_use]
    pub fn is_write_failure(&self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded { .. }
                | Self::DatabaseQuery(_)
                | Self::Json(_)
                | Self::MalformedCollection { .. }
        )
    }
}
