//! Catalog core: the transactional coordinator and the read side.
//!
//! `CatalogService` drives multi-step create/delete workflows spanning the
//! relational repository (`bookbin-db`) and the object store
//! (`crate::storage`), compensating when either side fails. `CatalogQuery`
//! is the read-only view joining books with their images.
//!
//! Inputs arrive as explicit structs with already-validated fields; the
//! calling layer owns request parsing and validation.

mod query;
mod service;

pub use query::CatalogQuery;
pub use service::{CatalogService, DeleteOutcome};

use bytes::Bytes;

/// Fields for a new book.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub summary: String,
    pub author: String,
    pub year: i32,
    pub status: bool,
}

/// Partial book update. A `None` field retains the stored value; under this
/// policy a field cannot be cleared.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub status: Option<bool>,
}

/// One uploaded image payload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub original_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}
