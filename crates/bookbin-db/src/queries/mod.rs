//! Database query modules.
//!
//! This module organizes all database operations into logical groups:
//! - books: Book CRUD and book-with-images joins
//! - images: Image CRUD
//!
//! Every function takes a `&Connection` so callers can run a group of
//! operations inside one `rusqlite::Transaction`.

pub mod books;
pub mod images;

use chrono::{DateTime, Utc};

/// Parse an RFC 3339 timestamp column written by this crate.
pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}
