//! Transactional coordinator for create/update/delete workflows.
//!
//! The relational store and the object store cannot share a transaction, so
//! the coordinator sequences the two sides and compensates when one fails:
//! the book and all its image rows commit or roll back as one relational
//! unit, blob uploads fan out afterwards, and any upload failure undoes the
//! whole create (rows and already-written blobs). Deletes mirror this:
//! image rows first, then blobs, best-effort across siblings.

use std::sync::Arc;

use bookbin_common::{BookId, Error, ImageId, Result};
use bookbin_db::models::{Book, BookWithImages, Image};
use bookbin_db::pool::{get_conn, DbPool};
use bookbin_db::queries::{books, images};
use bytes::Bytes;
use chrono::Utc;
use futures::future;

use crate::storage::ObjectStore;

use super::{BookPatch, CatalogQuery, ImageUpload, NewBook};

/// Result of a successful delete. Per-image cleanup is best-effort; any
/// image whose row or blob could not be removed is reported as a warning
/// alongside overall success, never as a failure.
#[derive(Debug)]
pub struct DeleteOutcome {
    pub book_id: BookId,
    /// Images whose row and blob were both removed.
    pub images_removed: usize,
    pub warnings: Vec<String>,
}

/// Coordinates the relational catalog with the object store.
pub struct CatalogService {
    pool: DbPool,
    store: Arc<dyn ObjectStore>,
    query: CatalogQuery,
    public_base_url: String,
}

/// An upload staged for one create operation: the image row to insert and
/// the payload to push to the object store.
struct StagedImage {
    image: Image,
    content_type: String,
    bytes: Bytes,
}

impl CatalogService {
    pub fn new(
        pool: DbPool,
        store: Arc<dyn ObjectStore>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            query: CatalogQuery::new(pool.clone()),
            pool,
            store,
            public_base_url: public_base_url.into(),
        }
    }

    /// Create a book together with zero or more images.
    ///
    /// The book row and every image row commit in one transaction; blob
    /// uploads then fan out concurrently. If any upload fails the whole
    /// create is undone (compensating row and blob deletes) and the first
    /// upload error is surfaced. On success returns the book re-fetched
    /// with its images.
    pub async fn create(
        &self,
        new_book: NewBook,
        uploads: Vec<ImageUpload>,
    ) -> Result<BookWithImages> {
        let now = Utc::now();
        let book = Book {
            id: BookId::new(),
            title: new_book.title,
            summary: new_book.summary,
            author: new_book.author,
            year: new_book.year,
            status: new_book.status,
            created_at: now,
            updated_at: now,
        };

        // One timestamp keys every upload of this operation; the UNIQUE
        // constraint on images.name backstops filename collisions.
        let millis = now.timestamp_millis();
        let staged: Vec<StagedImage> = uploads
            .into_iter()
            .map(|upload| {
                let key = derive_storage_key(millis, &upload.original_name);
                let url = public_url(&self.public_base_url, &key);
                StagedImage {
                    image: Image {
                        id: ImageId::new(),
                        name: key,
                        url,
                        book_id: book.id,
                        created_at: now,
                        updated_at: now,
                    },
                    content_type: upload.content_type,
                    bytes: upload.bytes,
                }
            })
            .collect();

        // Relational phase. The connection is scoped so the transaction
        // never crosses an await; dropping the transaction on the error
        // paths rolls everything back.
        {
            let mut conn = get_conn(&self.pool)?;
            let tx = conn
                .transaction()
                .map_err(|e| Error::database(e.to_string()))?;

            books::insert_book(&tx, &book)
                .map_err(|e| Error::book_create_failed(e.to_string()))?;

            for staged_image in &staged {
                images::insert_image(&tx, &staged_image.image)
                    .map_err(|e| Error::image_create_failed(e.to_string()))?;
            }

            tx.commit()
                .map_err(|e| Error::book_create_failed(e.to_string()))?;
        }

        tracing::info!(book_id = %book.id, images = staged.len(), "created book");

        // Upload phase: fan out, join all.
        let put_results = future::join_all(staged.iter().map(|staged_image| {
            self.store.put(
                &staged_image.image.name,
                &staged_image.content_type,
                staged_image.bytes.clone(),
            )
        }))
        .await;

        if let Some(first_err) = put_results.into_iter().find_map(|result| result.err()) {
            tracing::warn!(
                book_id = %book.id,
                error = %first_err,
                "image upload failed, undoing create"
            );
            self.undo_create(book.id, &staged).await;
            return Err(first_err);
        }

        self.query.get_by_id(book.id)
    }

    /// Apply a partial update to a book.
    ///
    /// Merge-with-existing: any `None` field in the patch keeps its stored
    /// value. Returns the re-fetched book.
    pub async fn update(&self, id: BookId, patch: BookPatch) -> Result<Book> {
        let conn = get_conn(&self.pool)?;

        let Some(existing) = books::get_book(&conn, id)? else {
            return Err(Error::BookNotFound(id));
        };

        let merged = Book {
            id: existing.id,
            title: patch.title.unwrap_or(existing.title),
            summary: patch.summary.unwrap_or(existing.summary),
            author: patch.author.unwrap_or(existing.author),
            year: patch.year.unwrap_or(existing.year),
            status: patch.status.unwrap_or(existing.status),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        let updated = books::update_book(&conn, &merged)
            .map_err(|e| Error::book_update_failed(e.to_string()))?;
        if !updated {
            return Err(Error::BookNotFound(id));
        }

        tracing::info!(book_id = %id, "updated book");

        books::get_book(&conn, id)?.ok_or(Error::BookNotFound(id))
    }

    /// Delete a book, its image rows, and its blobs.
    ///
    /// Per image the row goes first, then the blob; a failed row delete
    /// skips that image's blob but never blocks its siblings. Cleanup
    /// failures surface as warnings on a successful outcome.
    pub async fn delete(&self, id: BookId) -> Result<DeleteOutcome> {
        let found = {
            let conn = get_conn(&self.pool)?;
            books::get_book_with_images(&conn, id)?
        };
        let Some(with_images) = found else {
            return Err(Error::BookNotFound(id));
        };

        let cleanups = with_images.images.iter().map(|image| async move {
            {
                let conn = get_conn(&self.pool)?;
                images::delete_image(&conn, image.id)?;
            }
            self.store.delete(&image.name).await
        });

        let mut warnings = Vec::new();
        for (image, result) in with_images
            .images
            .iter()
            .zip(future::join_all(cleanups).await)
        {
            if let Err(e) = result {
                tracing::warn!(
                    image_id = %image.id,
                    key = %image.name,
                    error = %e,
                    "image cleanup failed"
                );
                warnings.push(format!("image {}: {}", image.id, e));
            }
        }

        {
            let conn = get_conn(&self.pool)?;
            books::delete_book(&conn, id)?;
        }

        tracing::info!(
            book_id = %id,
            images = with_images.images.len(),
            warnings = warnings.len(),
            "deleted book"
        );

        Ok(DeleteOutcome {
            book_id: id,
            images_removed: with_images.images.len() - warnings.len(),
            warnings,
        })
    }

    /// Compensation for a failed upload fan-out: remove every blob that may
    /// have been written, then the committed rows. Blob deletes are
    /// idempotent, so keys whose upload never landed are safe to delete.
    /// Failures here are logged, not surfaced; the caller already has the
    /// original upload error.
    async fn undo_create(&self, book_id: BookId, staged: &[StagedImage]) {
        for staged_image in staged {
            if let Err(e) = self.store.delete(&staged_image.image.name).await {
                tracing::error!(
                    key = %staged_image.image.name,
                    error = %e,
                    "blob cleanup failed during create compensation"
                );
            }
        }

        let result = get_conn(&self.pool).and_then(|mut conn| {
            let tx = conn
                .transaction()
                .map_err(|e| Error::database(e.to_string()))?;
            for staged_image in staged {
                images::delete_image(&tx, staged_image.image.id)?;
            }
            books::delete_book(&tx, book_id)?;
            tx.commit().map_err(|e| Error::database(e.to_string()))
        });
        if let Err(e) = result {
            tracing::error!(
                book_id = %book_id,
                error = %e,
                "row cleanup failed during create compensation"
            );
        }
    }
}

/// Storage key for an upload: `<unix-millis>-<original name with whitespace
/// replaced by underscores>`. The format matches existing stored keys and
/// must not change.
fn derive_storage_key(millis: i64, original_name: &str) -> String {
    let sanitized: String = original_name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{}-{}", millis, sanitized)
}

/// Public address for a stored object.
fn public_url(base: &str, key: &str) -> String {
    format!("{}/images/{}", base.trim_end_matches('/'), key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_replaces_whitespace() {
        assert_eq!(
            derive_storage_key(1700000000000, "my book cover.jpg"),
            "1700000000000-my_book_cover.jpg"
        );
    }

    #[test]
    fn storage_key_handles_tabs_and_plain_names() {
        assert_eq!(
            derive_storage_key(1700000000000, "a\tb.png"),
            "1700000000000-a_b.png"
        );
        assert_eq!(
            derive_storage_key(1700000000000, "plain.png"),
            "1700000000000-plain.png"
        );
    }

    #[test]
    fn public_url_joins_base_and_key() {
        assert_eq!(
            public_url("https://pub.example.com", "1-k.jpg"),
            "https://pub.example.com/images/1-k.jpg"
        );
        assert_eq!(
            public_url("https://pub.example.com/", "1-k.jpg"),
            "https://pub.example.com/images/1-k.jpg"
        );
    }
}
