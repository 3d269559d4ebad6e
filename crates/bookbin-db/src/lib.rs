//! Bookbin-DB: Database schema and query operations
//!
//! This crate provides the relational side of the catalog using SQLite
//! with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `schema` - Embedded schema applied at pool initialization
//! - `pool` - Connection pool management
//! - `models` - Rust models matching the database schema
//! - `queries` - Database query operations
//!
//! All query functions take a `&Connection`, so they compose inside a
//! `rusqlite::Transaction` (which derefs to `Connection`): a book and all of
//! its image rows commit or roll back together.
//!
//! # Example
//!
//! ```no_run
//! use bookbin_db::pool::{init_pool, get_conn};
//! use bookbin_db::queries::books;
//!
//! let pool = init_pool("/var/lib/bookbin/catalog.sqlite").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let all = books::get_all_books(&conn).unwrap();
//! println!("{} books", all.len());
//! ```

pub mod models;
pub mod pool;
pub mod queries;
pub mod schema;
