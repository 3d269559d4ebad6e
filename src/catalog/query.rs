//! Read-only catalog queries.

use bookbin_common::{BookId, Error, Result};
use bookbin_db::models::BookWithImages;
use bookbin_db::pool::{get_conn, DbPool};
use bookbin_db::queries::books;

/// Read side of the catalog: books joined with their images.
///
/// Every read reflects the relational store at call time; there is no
/// in-process caching.
#[derive(Clone)]
pub struct CatalogQuery {
    pool: DbPool,
}

impl CatalogQuery {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// All books with their images.
    ///
    /// Zero rows is the signaled-empty condition (`EmptyCollection`),
    /// distinct from a missing id, so the calling layer can answer
    /// "no content" rather than "not found".
    pub fn get_all(&self) -> Result<Vec<BookWithImages>> {
        let conn = get_conn(&self.pool)?;
        let all = books::get_all_books_with_images(&conn)?;
        if all.is_empty() {
            return Err(Error::EmptyCollection);
        }
        Ok(all)
    }

    /// One book with its images, or `BookNotFound`.
    pub fn get_by_id(&self, id: BookId) -> Result<BookWithImages> {
        let conn = get_conn(&self.pool)?;
        books::get_book_with_images(&conn, id)?.ok_or(Error::BookNotFound(id))
    }
}
