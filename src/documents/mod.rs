use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

mod bucket;
mod memory;

pub use bucket::BucketClient;
pub use memory::MemoryDocumentStore;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document not found")]
    NotFound,
    #[error("document storage error: {0}")]
    Provider(String),
}

/// Private-bucket document boundary. There is no public read path:
/// every download goes through a freshly signed, short-lived URL, so
/// each access re-proves the caller's unlock.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), DocumentError>;

    /// Issues a time-limited capability URL for one stored object.
    /// Expiry is enforced by the store itself, not by this service.
    async fn sign(&self, path: &str, ttl: Duration) -> Result<Url, DocumentError>;

    async fn remove(&self, path: &str) -> Result<(), DocumentError>;
}
