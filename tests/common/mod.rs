//! Shared harness for integration tests.

use std::sync::Arc;

use bookbin::catalog::{CatalogQuery, CatalogService, ImageUpload, NewBook};
use bookbin::storage::{MemoryObjectStore, ObjectStore};
use bookbin_db::pool::{init_pool, DbPool};
use bytes::Bytes;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

pub const PUBLIC_BASE_URL: &str = "https://cdn.example.test";

/// A catalog wired against a file-backed SQLite pool in a temp directory
/// and an in-memory object store. The file-backed pool gives the same
/// cross-connection write behavior as production, which the concurrency
/// tests rely on.
pub struct TestHarness {
    pub pool: DbPool,
    pub store: Arc<MemoryObjectStore>,
    pub service: Arc<CatalogService>,
    pub query: CatalogQuery,
    _dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        init_tracing();

        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("catalog.sqlite");
        let pool = init_pool(db_path.to_str().unwrap()).unwrap();

        let store = Arc::new(MemoryObjectStore::new());
        let service = Arc::new(CatalogService::new(
            pool.clone(),
            store.clone() as Arc<dyn ObjectStore>,
            PUBLIC_BASE_URL,
        ));
        let query = CatalogQuery::new(pool.clone());

        Self {
            pool,
            store,
            service,
            query,
            _dir: dir,
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn sample_book(title: &str) -> NewBook {
    NewBook {
        title: title.to_string(),
        summary: "a summary".to_string(),
        author: "an author".to_string(),
        year: 1984,
        status: true,
    }
}

pub fn upload(original_name: &str) -> ImageUpload {
    ImageUpload {
        original_name: original_name.to_string(),
        content_type: "image/jpeg".to_string(),
        bytes: Bytes::from_static(b"jpeg-bytes"),
    }
}
