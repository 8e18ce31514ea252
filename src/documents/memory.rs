use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

use super::{DocumentError, DocumentStore};

/// In-memory [`DocumentStore`] for tests and local development.
///
/// Signed URLs carry their own expiry, checked by
/// [`is_valid_at`](Self::is_valid_at) the way a real store would
/// reject an expired capability.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    objects: Mutex<HashMap<String, StoredDocument>>,
}

#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub content_type: String,
    pub size: usize,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.lock().contains_key(path)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<StoredDocument> {
        self.lock().get(path).cloned()
    }

    /// Would the store still honor this signed URL at `at`?
    #[must_use]
    pub fn is_valid_at(&self, url: &Url, at: DateTime<Utc>) -> bool {
        let path = url.path().trim_start_matches('/');
        if !self.lock().contains_key(path) {
            return false;
        }

        url.query_pairs()
            .find(|(key, _)| key == "expires")
            .and_then(|(_, value)| value.parse::<i64>().ok())
            .is_some_and(|expires| at.timestamp() <= expires)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoredDocument>> {
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), DocumentError> {
        self.lock().insert(
            path.to_string(),
            StoredDocument {
                content_type: content_type.to_string(),
                size: bytes.len(),
            },
        );
        Ok(())
    }

    async fn sign(&self, path: &str, ttl: Duration) -> Result<Url, DocumentError> {
        if !self.lock().contains_key(path) {
            return Err(DocumentError::NotFound);
        }

        let expires = Utc::now().timestamp() + ttl.as_secs() as i64;
        let url = format!("memory://signed/{path}?expires={expires}");
        Url::parse(&url).map_err(|e| DocumentError::Provider(e.to_string()))
    }

    async fn remove(&self, path: &str) -> Result<(), DocumentError> {
        match self.lock().remove(path) {
            Some(..) => Ok(()),
            None => Err(DocumentError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[tokio::test]
    async fn signed_links_expire_with_the_store() {
        let store = MemoryDocumentStore::new();
        store
            .upload("d1/cdl_1.pdf", b"%PDF-".to_vec(), "application/pdf")
            .await
            .unwrap();

        let issued_at = Utc::now();
        let url = store
            .sign("d1/cdl_1.pdf", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(store.is_valid_at(&url, issued_at + TimeDelta::seconds(30)));
        assert!(!store.is_valid_at(&url, issued_at + TimeDelta::seconds(120)));
    }

    #[tokio::test]
    async fn signing_unknown_path_fails() {
        let store = MemoryDocumentStore::new();
        assert!(matches!(
            store.sign("missing.pdf", Duration::from_secs(60)).await,
            Err(DocumentError::NotFound)
        ));
    }
}
