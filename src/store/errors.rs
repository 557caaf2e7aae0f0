//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Data store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Entity is not registered with the store
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// Record is not a JSON object
    #[error("Record for '{0}' must be a JSON object")]
    NotAnObject(String),

    /// Primary key already present
    #[error("Duplicate key '{id}' in '{entity}'")]
    DuplicateKey { entity: String, id: String },

    /// A lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Returns the error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::UnknownEntity(_) => "CRUD_STORE_UNKNOWN_ENTITY",
            StoreError::NotAnObject(_) => "CRUD_STORE_NOT_AN_OBJECT",
            StoreError::DuplicateKey { .. } => "CRUD_STORE_DUPLICATE_KEY",
            StoreError::LockPoisoned => "CRUD_STORE_LOCK_POISONED",
        }
    }
}
