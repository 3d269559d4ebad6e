//! Image database queries.
//!
//! CRUD operations for image rows. Insert and delete are the primitives the
//! coordinator drives inside its transactions; lookups exist for the read
//! side and for verification in tests.

use bookbin_common::{BookId, Error, ImageId, Result};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::Image;
use crate::queries::parse_timestamp;

const IMAGE_COLUMNS: &str = "id, name, url, book_id, created_at, updated_at";

/// Parse an image from a database row.
///
/// Expects columns in order: id, name, url, book_id, created_at, updated_at.
fn parse_image_row(row: &rusqlite::Row) -> rusqlite::Result<Image> {
    Ok(Image {
        id: ImageId::from(Uuid::parse_str(&row.get::<_, String>(0)?).unwrap()),
        name: row.get(1)?,
        url: row.get(2)?,
        book_id: BookId::from(Uuid::parse_str(&row.get::<_, String>(3)?).unwrap()),
        created_at: parse_timestamp(&row.get::<_, String>(4)?),
        updated_at: parse_timestamp(&row.get::<_, String>(5)?),
    })
}

/// Insert a new image record.
///
/// # Returns
///
/// * `Ok(ImageId)` - The ID of the inserted image
/// * `Err(Error)` - If a database error occurs (including a violated
///   `name` uniqueness or `book_id` foreign key constraint)
pub fn insert_image(conn: &Connection, image: &Image) -> Result<ImageId> {
    conn.execute(
        "INSERT INTO images (id, name, url, book_id, created_at, updated_at)
         VALUES (:id, :name, :url, :book_id, :created_at, :updated_at)",
        rusqlite::named_params! {
            ":id": image.id.to_string(),
            ":name": &image.name,
            ":url": &image.url,
            ":book_id": image.book_id.to_string(),
            ":created_at": image.created_at.to_rfc3339(),
            ":updated_at": image.updated_at.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(image.id)
}

/// Get an image by ID.
///
/// # Returns
///
/// * `Ok(Some(Image))` - The image if found
/// * `Ok(None)` - If the image does not exist
/// * `Err(Error)` - If a database error occurs
pub fn get_image(conn: &Connection, id: ImageId) -> Result<Option<Image>> {
    let result = conn.query_row(
        &format!("SELECT {} FROM images WHERE id = :id", IMAGE_COLUMNS),
        rusqlite::named_params! { ":id": id.to_string() },
        parse_image_row,
    );

    match result {
        Ok(image) => Ok(Some(image)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Get all images belonging to a book, ordered by storage key.
pub fn get_images_for_book(conn: &Connection, book_id: BookId) -> Result<Vec<Image>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM images WHERE book_id = :book_id ORDER BY name",
            IMAGE_COLUMNS
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let images = stmt
        .query_map(
            rusqlite::named_params! { ":book_id": book_id.to_string() },
            parse_image_row,
        )
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(images)
}

/// Delete an image by ID.
///
/// # Returns
///
/// * `Ok(true)` - If the image was deleted
/// * `Ok(false)` - If the image did not exist
/// * `Err(Error)` - If a database error occurs
pub fn delete_image(conn: &Connection, id: ImageId) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "DELETE FROM images WHERE id = :id",
            rusqlite::named_params! { ":id": id.to_string() },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows_affected > 0)
}
