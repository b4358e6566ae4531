//! Error types for the tour library.
//!
//! Only construction-time surfaces are fallible: opening storage, loading
//! catalog and route data, parsing selectors and key combinations. Once an
//! [`Orchestrator`](crate::Orchestrator) is built, storage failures degrade
//! instead of propagating.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for tour operations.
#[derive(Error, Debug)]
pub enum TourError {
    /// SQLite storage errors
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// A CSS selector outside the supported grammar
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
    /// A key combination that cannot be parsed
    #[error("Invalid key combination '{combo}': {reason}")]
    InvalidKeyCombo { combo: String, reason: String },
    /// Malformed catalog or route data
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Catalog or route data that parses but is inconsistent
    #[error("Invalid catalog: {reason}")]
    InvalidCatalog { reason: String },
    /// Tour not found for the given ID
    #[error("Tour '{id}' not found")]
    TourNotFound { id: String },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating storage errors with context.
pub struct StorageErrorBuilder {
    message: String,
}

impl StorageErrorBuilder {
    /// Create a new storage error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> TourError {
        TourError::Storage {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating selector errors.
pub struct InvalidSelectorBuilder {
    selector: String,
}

impl InvalidSelectorBuilder {
    /// Create a new invalid selector error builder.
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> TourError {
        TourError::InvalidSelector {
            selector: self.selector,
            reason: reason.into(),
        }
    }
}

impl TourError {
    /// Creates a builder for storage errors.
    pub fn storage(message: impl Into<String>) -> StorageErrorBuilder {
        StorageErrorBuilder::new(message)
    }

    /// Creates a builder for selector errors.
    pub fn invalid_selector(selector: impl Into<String>) -> InvalidSelectorBuilder {
        InvalidSelectorBuilder::new(selector)
    }

    /// Creates an inconsistent-catalog error.
    pub fn invalid_catalog(reason: impl Into<String>) -> Self {
        Self::InvalidCatalog {
            reason: reason.into(),
        }
    }
}

/// Specialized extension trait for storage-related Results.
pub trait StorageResultExt<T> {
    /// Map SQLite errors with a message.
    fn storage_context(self, message: &str) -> Result<T>;
}

impl<T> StorageResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn storage_context(self, message: &str) -> Result<T> {
        self.map_err(|e| TourError::storage(message).with_source(e))
    }
}

/// Result type alias for tour operations
pub type Result<T> = std::result::Result<T, TourError>;
