//! Book database queries.
//!
//! CRUD operations for book rows plus the book-with-images joins the read
//! side returns. The update here is a full-row write; merge-with-existing
//! semantics for partial updates live in the coordinator.

use bookbin_common::{BookId, Error, Result};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::{Book, BookWithImages};
use crate::queries::images::get_images_for_book;
use crate::queries::parse_timestamp;

const BOOK_COLUMNS: &str = "id, title, summary, author, year, status, created_at, updated_at";

/// Parse a book from a database row.
///
/// Expects columns in order: id, title, summary, author, year, status,
/// created_at, updated_at.
fn parse_book_row(row: &rusqlite::Row) -> rusqlite::Result<Book> {
    Ok(Book {
        id: BookId::from(Uuid::parse_str(&row.get::<_, String>(0)?).unwrap()),
        title: row.get(1)?,
        summary: row.get(2)?,
        author: row.get(3)?,
        year: row.get(4)?,
        status: row.get(5)?,
        created_at: parse_timestamp(&row.get::<_, String>(6)?),
        updated_at: parse_timestamp(&row.get::<_, String>(7)?),
    })
}

/// Insert a new book record.
pub fn insert_book(conn: &Connection, book: &Book) -> Result<BookId> {
    conn.execute(
        "INSERT INTO books (id, title, summary, author, year, status, created_at, updated_at)
         VALUES (:id, :title, :summary, :author, :year, :status, :created_at, :updated_at)",
        rusqlite::named_params! {
            ":id": book.id.to_string(),
            ":title": &book.title,
            ":summary": &book.summary,
            ":author": &book.author,
            ":year": book.year,
            ":status": book.status,
            ":created_at": book.created_at.to_rfc3339(),
            ":updated_at": book.updated_at.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(book.id)
}

/// Get a book by ID.
///
/// # Returns
///
/// * `Ok(Some(Book))` - The book if found
/// * `Ok(None)` - If the book does not exist
/// * `Err(Error)` - If a database error occurs
pub fn get_book(conn: &Connection, id: BookId) -> Result<Option<Book>> {
    let result = conn.query_row(
        &format!("SELECT {} FROM books WHERE id = :id", BOOK_COLUMNS),
        rusqlite::named_params! { ":id": id.to_string() },
        parse_book_row,
    );

    match result {
        Ok(book) => Ok(Some(book)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Get all books, ordered by creation time.
pub fn get_all_books(conn: &Connection) -> Result<Vec<Book>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM books ORDER BY created_at, id",
            BOOK_COLUMNS
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let books = stmt
        .query_map([], parse_book_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(books)
}

/// Get a book joined with its images.
pub fn get_book_with_images(conn: &Connection, id: BookId) -> Result<Option<BookWithImages>> {
    let Some(book) = get_book(conn, id)? else {
        return Ok(None);
    };
    let images = get_images_for_book(conn, id)?;
    Ok(Some(BookWithImages { book, images }))
}

/// Get every book joined with its images.
pub fn get_all_books_with_images(conn: &Connection) -> Result<Vec<BookWithImages>> {
    get_all_books(conn)?
        .into_iter()
        .map(|book| {
            let images = get_images_for_book(conn, book.id)?;
            Ok(BookWithImages { book, images })
        })
        .collect()
}

/// Overwrite a book row with the given (already merged) record.
///
/// # Returns
///
/// * `Ok(true)` - If the book was updated
/// * `Ok(false)` - If no book row matched the ID
/// * `Err(Error)` - If a database error occurs
pub fn update_book(conn: &Connection, book: &Book) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "UPDATE books
             SET title = :title, summary = :summary, author = :author,
                 year = :year, status = :status, updated_at = :updated_at
             WHERE id = :id",
            rusqlite::named_params! {
                ":id": book.id.to_string(),
                ":title": &book.title,
                ":summary": &book.summary,
                ":author": &book.author,
                ":year": book.year,
                ":status": book.status,
                ":updated_at": book.updated_at.to_rfc3339(),
            },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows_affected > 0)
}

/// Delete a book by ID. Image rows cascade.
///
/// # Returns
///
/// * `Ok(true)` - If the book was deleted
/// * `Ok(false)` - If the book did not exist
/// * `Err(Error)` - If a database error occurs
pub fn delete_book(conn: &Connection, id: BookId) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "DELETE FROM books WHERE id = :id",
            rusqlite::named_params! { ":id": id.to_string() },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Image;
    use crate::pool::init_memory_pool;
    use crate::queries::images::insert_image;
    use bookbin_common::ImageId;
    use chrono::Utc;

    fn sample_book(title: &str, author: &str) -> Book {
        let now = Utc::now();
        Book {
            id: BookId::new(),
            title: title.to_string(),
            summary: "a summary".to_string(),
            author: author.to_string(),
            year: 1949,
            status: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_image(book_id: BookId, name: &str) -> Image {
        let now = Utc::now();
        Image {
            id: ImageId::new(),
            name: name.to_string(),
            url: format!("https://cdn.example.test/images/{}", name),
            book_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_insert_and_get_book() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let book = sample_book("Nineteen Eighty-Four", "George Orwell");
        let id = insert_book(&conn, &book).unwrap();

        let found = get_book(&conn, id).unwrap().unwrap();
        assert_eq!(found.id, book.id);
        assert_eq!(found.title, "Nineteen Eighty-Four");
        assert_eq!(found.author, "George Orwell");
        assert_eq!(found.year, 1949);
        assert!(found.status);
    }

    #[test]
    fn test_get_book_not_found() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let found = get_book(&conn, BookId::new()).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_insert_duplicate_id_rejected() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let book = sample_book("A", "B");
        insert_book(&conn, &book).unwrap();
        assert!(insert_book(&conn, &book).is_err());
    }

    #[test]
    fn test_get_all_books_empty() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let books = get_all_books(&conn).unwrap();
        assert!(books.is_empty());
    }

    #[test]
    fn test_get_all_books() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        insert_book(&conn, &sample_book("A", "X")).unwrap();
        insert_book(&conn, &sample_book("B", "Y")).unwrap();

        let books = get_all_books(&conn).unwrap();
        assert_eq!(books.len(), 2);
    }

    #[test]
    fn test_get_book_with_images() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let book = sample_book("Illustrated", "Author");
        insert_book(&conn, &book).unwrap();
        insert_image(&conn, &sample_image(book.id, "1-front.jpg")).unwrap();
        insert_image(&conn, &sample_image(book.id, "1-back.jpg")).unwrap();

        let with_images = get_book_with_images(&conn, book.id).unwrap().unwrap();
        assert_eq!(with_images.book.id, book.id);
        assert_eq!(with_images.images.len(), 2);
    }

    #[test]
    fn test_get_book_with_images_missing() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let found = get_book_with_images(&conn, BookId::new()).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_get_all_books_with_images() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let with_cover = sample_book("With Cover", "A");
        let bare = sample_book("Bare", "B");
        insert_book(&conn, &with_cover).unwrap();
        insert_book(&conn, &bare).unwrap();
        insert_image(&conn, &sample_image(with_cover.id, "1-cover.jpg")).unwrap();

        let all = get_all_books_with_images(&conn).unwrap();
        assert_eq!(all.len(), 2);

        let covered = all.iter().find(|b| b.book.id == with_cover.id).unwrap();
        assert_eq!(covered.images.len(), 1);
        let bare_found = all.iter().find(|b| b.book.id == bare.id).unwrap();
        assert!(bare_found.images.is_empty());
    }

    #[test]
    fn test_update_book() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let mut book = sample_book("Old Title", "Author");
        insert_book(&conn, &book).unwrap();

        book.title = "New Title".to_string();
        book.status = false;
        book.updated_at = Utc::now();
        let updated = update_book(&conn, &book).unwrap();
        assert!(updated);

        let found = get_book(&conn, book.id).unwrap().unwrap();
        assert_eq!(found.title, "New Title");
        assert!(!found.status);
        assert_eq!(found.author, "Author");
    }

    #[test]
    fn test_update_book_missing() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let book = sample_book("Ghost", "Nobody");
        let updated = update_book(&conn, &book).unwrap();
        assert!(!updated);
    }

    #[test]
    fn test_delete_book() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let book = sample_book("Doomed", "Author");
        insert_book(&conn, &book).unwrap();

        let deleted = delete_book(&conn, book.id).unwrap();
        assert!(deleted);
        assert!(get_book(&conn, book.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_book_not_found() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let deleted = delete_book(&conn, BookId::new()).unwrap();
        assert!(!deleted);
    }

    #[test]
    fn test_delete_book_cascades_images() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let book = sample_book("Cascade", "Author");
        insert_book(&conn, &book).unwrap();
        insert_image(&conn, &sample_image(book.id, "1-cover.jpg")).unwrap();

        delete_book(&conn, book.id).unwrap();

        let images = get_images_for_book(&conn, book.id).unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn test_transaction_rolls_back_book_and_images() {
        let pool = init_memory_pool().unwrap();
        let mut conn = pool.get().unwrap();

        let book = sample_book("Transient", "Author");
        {
            let tx = conn.transaction().unwrap();
            insert_book(&tx, &book).unwrap();
            insert_image(&tx, &sample_image(book.id, "1-cover.jpg")).unwrap();
            // Dropped without commit: everything rolls back.
        }

        assert!(get_book(&conn, book.id).unwrap().is_none());
        assert!(get_images_for_book(&conn, book.id).unwrap().is_empty());
    }
}
