//! Error types for stockroom-core

use thiserror::Error;

use crate::item::ItemId;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors surfaced by the catalog service to its host.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A required field was missing or empty.
    #[error("Validation error: field '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// No item with this id exists in the collection.
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    /// The backing store could not be read or written.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

impl CatalogError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        CatalogError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}

/// Errors from an item store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt collection data: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Configuration loading or validation error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Failed to open store: {0}")]
    Store(#[from] StoreError),
}
