use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

use super::{DocumentError, DocumentStore};
use crate::config;

/// HTTP client for the storage service's private bucket.
pub struct BucketClient {
    endpoint: String,
    bucket: String,
    service_key: String,
    http: reqwest::Client,
}

impl BucketClient {
    pub fn new(config: &config::Storage) -> Result<Self, DocumentError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| DocumentError::Provider(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.as_str().trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            service_key: config.service_key.clone(),
            http,
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/object/{}/{}", self.endpoint, self.bucket, path)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignResponse {
    signed_url: String,
}

#[async_trait]
impl DocumentStore for BucketClient {
    #[tracing::instrument(skip_all, name = "documents.bucket.upload", fields(%path))]
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), DocumentError> {
        let response = self
            .http
            .post(self.object_url(path))
            .bearer_auth(&self.service_key)
            .header("content-type", content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await
            .map_err(|e| DocumentError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DocumentError::Provider(format!(
                "upload failed with {status}: {body}"
            )));
        }

        Ok(())
    }

    #[tracing::instrument(skip_all, name = "documents.bucket.sign", fields(%path))]
    async fn sign(&self, path: &str, ttl: Duration) -> Result<Url, DocumentError> {
        let response = self
            .http
            .post(format!(
                "{}/object/sign/{}/{}",
                self.endpoint, self.bucket, path
            ))
            .bearer_auth(&self.service_key)
            .json(&json!({ "expiresIn": ttl.as_secs() }))
            .send()
            .await
            .map_err(|e| DocumentError::Provider(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DocumentError::NotFound);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DocumentError::Provider(format!(
                "signing failed with {status}: {body}"
            )));
        }

        let signed = response
            .json::<SignResponse>()
            .await
            .map_err(|e| DocumentError::Provider(e.to_string()))?;

        // The service answers with a path relative to its base URL.
        let url = format!(
            "{}/{}",
            self.endpoint,
            signed.signed_url.trim_start_matches('/')
        );
        Url::parse(&url).map_err(|e| DocumentError::Provider(e.to_string()))
    }

    #[tracing::instrument(skip_all, name = "documents.bucket.remove", fields(%path))]
    async fn remove(&self, path: &str) -> Result<(), DocumentError> {
        let response = self
            .http
            .delete(self.object_url(path))
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| DocumentError::Provider(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DocumentError::NotFound);
        }

        if !response.status().is_success() {
            let status = response.status();
            return Err(DocumentError::Provider(format!(
                "removal failed with {status}"
            )));
        }

        Ok(())
    }
}
