//! Embedded database schema.
//!
//! The schema is a single idempotent script executed on every pool
//! initialization. There is deliberately no migration framework; schema
//! evolution is out of scope for this crate.

use bookbin_common::{Error, Result};
use rusqlite::Connection;

const SCHEMA: &str = include_str!("schema.sql");

/// Apply the embedded schema to a connection.
///
/// Safe to call repeatedly; every statement is `IF NOT EXISTS`.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .map_err(|e| Error::database(format!("Failed to apply schema: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('books', 'images')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
    }

    #[test]
    fn test_schema_creates_indexes() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'index' AND name IN
                 ('idx_books_id_author', 'idx_images_id', 'idx_images_book_id')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_image_name_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO books (id, title, summary, author, year, status, created_at, updated_at)
             VALUES ('b1', 't', 's', 'a', 2000, 1, 'now', 'now')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO images (id, name, url, book_id, created_at, updated_at)
             VALUES ('i1', 'k', 'u', 'b1', 'now', 'now')",
            [],
        )
        .unwrap();

        let dup = conn.execute(
            "INSERT INTO images (id, name, url, book_id, created_at, updated_at)
             VALUES ('i2', 'k', 'u', 'b1', 'now', 'now')",
            [],
        );
        assert!(dup.is_err());
    }
}
