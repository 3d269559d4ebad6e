//! Database connection pool management.
//!
//! Connection pooling for SQLite using r2d2. Every connection enables
//! foreign key enforcement and a busy timeout, and the embedded schema is
//! applied when the pool is created.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use uuid::Uuid;

use bookbin_common::{Error, Result};

use crate::schema;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Pragmas applied to every new connection. The busy timeout lets concurrent
/// write transactions queue instead of failing immediately.
const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;";

/// Initialize a new database pool backed by a file.
///
/// This will:
/// - Create the SQLite database file if it doesn't exist
/// - Set up connection pooling with r2d2
/// - Enable foreign key constraints and a busy timeout on all connections
/// - Apply the embedded schema
///
/// # Arguments
///
/// * `db_path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(DbPool)` - Initialized connection pool
/// * `Err(Error)` - If pool creation or schema setup fails
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));
    build_pool(manager)
}

/// Initialize an in-memory database pool for testing.
///
/// Uses a uniquely named shared-cache database so that every pooled
/// connection sees the same store; a plain `:memory:` manager would hand
/// each connection its own empty database. The data is lost when the pool
/// is dropped.
pub fn init_memory_pool() -> Result<DbPool> {
    let uri = format!(
        "file:bookbin-{}?mode=memory&cache=shared",
        Uuid::new_v4().simple()
    );
    let manager = SqliteConnectionManager::file(uri)
        .with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));
    build_pool(manager)
}

fn build_pool(manager: SqliteConnectionManager) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))?;

    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("Failed to get connection for schema setup: {}", e)))?;
    schema::init_schema(&conn)?;

    Ok(pool)
}

/// Get a connection from the pool.
///
/// Convenience wrapper around `pool.get()` that converts the r2d2 error
/// into the common Error type.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_memory_pool() {
        let pool = init_memory_pool().unwrap();
        assert_eq!(pool.max_size(), 4);
    }

    #[test]
    fn test_get_conn() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        // Verify foreign keys are enabled
        let enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_schema_applied_on_init() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='books'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_connections_share_one_database() {
        let pool = init_memory_pool().unwrap();

        {
            let conn = get_conn(&pool).unwrap();
            conn.execute(
                "INSERT INTO books (id, title, summary, author, year, status, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params!["b1", "t", "s", "a", 2024, 1, "now", "now"],
            )
            .unwrap();
        }

        // A different (or reused) connection must see the same data.
        let conn = get_conn(&pool).unwrap();
        let title: String = conn
            .query_row("SELECT title FROM books WHERE id = ?", ["b1"], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(title, "t");
    }

    #[test]
    fn test_memory_pools_are_independent() {
        let pool_a = init_memory_pool().unwrap();
        let pool_b = init_memory_pool().unwrap();

        let conn_a = get_conn(&pool_a).unwrap();
        conn_a
            .execute(
                "INSERT INTO books (id, title, summary, author, year, status, created_at, updated_at)
                 VALUES ('b1', 't', 's', 'a', 2024, 1, 'now', 'now')",
                [],
            )
            .unwrap();

        let conn_b = get_conn(&pool_b).unwrap();
        let count: i64 = conn_b
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_file_pool() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("catalog.sqlite");

        let pool = init_pool(db_path.to_str().unwrap()).unwrap();
        let conn = get_conn(&pool).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
