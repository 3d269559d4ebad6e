//! Bookbin-Common: shared types across the bookbin crates.
//!
//! This crate provides the pieces every other crate needs:
//!
//! - **Typed IDs**: Type-safe UUID wrappers for books and images
//! - **Error Handling**: The error taxonomy of the catalog core and a
//!   `Result` alias
//!
//! # Examples
//!
//! ```
//! use bookbin_common::{BookId, Error, Result};
//!
//! let id = BookId::new();
//!
//! fn example(id: BookId) -> Result<()> {
//!     Err(Error::BookNotFound(id))
//! }
//! ```

pub mod error;
pub mod ids;

pub use error::{Error, Result};
pub use ids::*;
