//! Internal Rust models matching the database schema.
//!
//! Strongly-typed structures that map to the `books` and `images` tables.
//! Identifier types come from bookbin-common.

use bookbin_common::{BookId, ImageId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Book record model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub summary: String,
    pub author: String,
    pub year: i32,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Image record model.
///
/// `name` is the object-storage key; `url` is the public address derived
/// from it. An image row always references exactly one book.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    pub id: ImageId,
    pub name: String,
    pub url: String,
    pub book_id: BookId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A book joined with all of its images.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookWithImages {
    #[serde(flatten)]
    pub book: Book,
    pub images: Vec<Image>,
}
