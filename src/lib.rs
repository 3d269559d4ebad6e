//! Bookbin - Book catalog core
//!
//! Coordinates a relational catalog of books (SQLite, via `bookbin-db`) with
//! image blobs held in an S3-compatible object store. The crate is a library
//! invoked by a request-handling layer: it receives already-validated input
//! and returns plain result/error values. It does not serve network
//! requests itself.

pub mod catalog;
pub mod config;
pub mod storage;

pub use bookbin_common::{BookId, Error, ImageId, Result};
