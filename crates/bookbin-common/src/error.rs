//! Common error types used throughout bookbin.
//!
//! The catalog core surfaces plain error kinds so the calling layer can map
//! them to responses. Not-found, signaled-empty, create/update failures, and
//! the two object-storage failure modes are all distinct variants.

use crate::ids::BookId;

/// Common error type for bookbin.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No book exists under the given id.
    #[error("Book not found: {0}")]
    BookNotFound(BookId),

    /// A listing operation yielded zero rows. Distinct from not-found.
    #[error("No books in catalog")]
    EmptyCollection,

    /// Inserting the book row (or committing its transaction) failed.
    #[error("Book create failed: {0}")]
    BookCreateFailed(String),

    /// Inserting an image row failed; the enclosing transaction rolls back.
    #[error("Image create failed: {0}")]
    ImageCreateFailed(String),

    /// Persisting a merged book update failed.
    #[error("Book update failed: {0}")]
    BookUpdateFailed(String),

    /// An object-storage write failed.
    #[error("Object storage write failed for {key}: {reason}")]
    StorageWriteFailed { key: String, reason: String },

    /// An object-storage delete failed. Deleting an absent key is not an
    /// error and never produces this variant.
    #[error("Object storage delete failed for {key}: {reason}")]
    StorageDeleteFailed { key: String, reason: String },

    /// Invalid input was provided. Validation happens upstream of the core;
    /// this covers configuration and construction-time problems.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new BookCreateFailed error.
    pub fn book_create_failed<S: Into<String>>(msg: S) -> Self {
        Self::BookCreateFailed(msg.into())
    }

    /// Create a new ImageCreateFailed error.
    pub fn image_create_failed<S: Into<String>>(msg: S) -> Self {
        Self::ImageCreateFailed(msg.into())
    }

    /// Create a new BookUpdateFailed error.
    pub fn book_update_failed<S: Into<String>>(msg: S) -> Self {
        Self::BookUpdateFailed(msg.into())
    }

    /// Create a new StorageWriteFailed error.
    pub fn storage_write<K: Into<String>, R: Into<String>>(key: K, reason: R) -> Self {
        Self::StorageWriteFailed {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a new StorageDeleteFailed error.
    pub fn storage_delete<K: Into<String>, R: Into<String>>(key: K, reason: R) -> Self {
        Self::StorageDeleteFailed {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
