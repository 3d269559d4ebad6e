//! Object storage clients.
//!
//! The store is an unowned external resource addressed purely by key; no
//! transaction semantics live here. Atomicity across the store and the
//! relational catalog is the coordinator's job (`crate::catalog`).

mod memory;
mod s3;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

use bookbin_common::Result;
use bytes::Bytes;

/// Client for a remote blob service.
///
/// Implementations are stateless per call and safe for unlimited concurrent
/// use; one instance is constructed at startup and shared process-wide.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object under the given key, overwriting any existing one.
    async fn put(&self, key: &str, content_type: &str, bytes: Bytes) -> Result<()>;

    /// Delete the object under the given key. Deleting an absent key is not
    /// an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
