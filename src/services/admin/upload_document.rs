use chrono::Utc;

use crate::error::{ApiError, ErrorCategory};
use crate::extract::SessionUser;
use crate::documents::DocumentStore;
use crate::models::id::DriverId;
use crate::store::Store;
use crate::App;

// Extension and MIME type are both checked; either alone is spoofable.
const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg"];
const ALLOWED_MIME_TYPES: &[&str] = &["application/pdf", "image/png", "image/jpeg"];

#[derive(Debug)]
pub struct UploadCdlDocument {
    pub driver_id: DriverId,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct UploadedDocument {
    pub path: String,
}

impl UploadCdlDocument {
    /// Stores a CDL document in the private bucket and records its
    /// path on the driver's private bundle. If recording the path
    /// fails, the freshly uploaded file is removed again so the
    /// bucket holds no orphans.
    #[tracing::instrument(
        skip_all,
        name = "services.admin.upload_cdl",
        fields(driver.id = %self.driver_id, size = self.bytes.len()),
    )]
    pub async fn perform(
        self,
        app: &App,
        session_user: &SessionUser,
    ) -> Result<UploadedDocument, ApiError> {
        super::ensure_admin(app, session_user).await?;

        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str())
            || !ALLOWED_MIME_TYPES.contains(&self.content_type.as_str())
        {
            return Err(ApiError::new(ErrorCategory::InvalidRequest)
                .message("Invalid file type. Only PDF and images are allowed."));
        }

        // Timestamped path sidesteps stale browser caches on re-upload.
        let path = format!(
            "{}/cdl_{}.{extension}",
            self.driver_id,
            Utc::now().timestamp_millis()
        );

        app.documents
            .upload(&path, self.bytes, &self.content_type)
            .await?;

        if let Err(error) = app.store.set_cdl_file_path(self.driver_id, &path).await {
            tracing::error!(
                %error,
                driver.id = %self.driver_id,
                "Failed to record CDL path, removing uploaded file"
            );

            if let Err(cleanup_error) = app.documents.remove(&path).await {
                tracing::error!(
                    error = %cleanup_error,
                    %path,
                    "Cleanup of uploaded CDL file failed"
                );
            }

            return Err(ApiError::new(ErrorCategory::InvalidRequest)
                .message(format!("Could not record uploaded document: {error}")));
        }

        tracing::info!(driver.id = %self.driver_id, "CDL uploaded");
        Ok(UploadedDocument { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use crate::test_utils::{self, TestResultExt};
    use assert_json_diff::assert_json_include;
    use serde_json::json;

    fn request(driver_id: DriverId) -> UploadCdlDocument {
        UploadCdlDocument {
            driver_id,
            file_name: "license.PDF".into(),
            content_type: "application/pdf".into(),
            bytes: b"%PDF-1.7".to_vec(),
        }
    }

    #[tokio::test]
    async fn uploads_and_records_path() {
        let harness = test_utils::build_test_app();
        let root = test_utils::admin(&harness.app, &harness.store, "root@example.com").await;
        let driver = test_utils::seed_driver_with_private(&harness.store).await;

        let uploaded = request(driver.id)
            .perform(&harness.app, &root.session_user())
            .await
            .unwrap();

        assert!(uploaded.path.starts_with(&driver.id.to_string()));
        assert!(uploaded.path.ends_with(".pdf"));
        assert!(harness.documents.contains(&uploaded.path));

        let private = harness
            .store
            .get_driver_private(driver.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(private.cdl_file_path, Some(uploaded.path));
    }

    #[tokio::test]
    async fn rejects_disallowed_file_types() {
        let harness = test_utils::build_test_app();
        let root = test_utils::admin(&harness.app, &harness.store, "root@example.com").await;
        let driver = test_utils::seed_driver_with_private(&harness.store).await;

        let mut bad_extension = request(driver.id);
        bad_extension.file_name = "malware.exe".into();

        let error = bad_extension
            .perform(&harness.app, &root.session_user())
            .await
            .expect_error_json();
        assert_json_include!(actual: error, expected: json!({ "code": "invalid_request" }));

        let mut bad_mime = request(driver.id);
        bad_mime.content_type = "text/html".into();

        let error = bad_mime
            .perform(&harness.app, &root.session_user())
            .await
            .expect_error_json();
        assert_json_include!(actual: error, expected: json!({ "code": "invalid_request" }));
    }

    #[tokio::test]
    async fn removes_file_when_record_write_fails() {
        let harness = test_utils::build_test_app();
        let root = test_utils::admin(&harness.app, &harness.store, "root@example.com").await;
        // No private bundle, so recording the path fails after upload.
        let driver = test_utils::seed_driver(&harness.store).await;

        let error = request(driver.id)
            .perform(&harness.app, &root.session_user())
            .await
            .expect_error_json();

        assert_json_include!(actual: error, expected: json!({ "code": "invalid_request" }));
        assert!(harness.documents.is_empty());
    }

    #[tokio::test]
    async fn rejects_non_admin() {
        let harness = test_utils::build_test_app();
        let alice = test_utils::recruiter(&harness.app, "alice@example.com");
        let driver = test_utils::seed_driver_with_private(&harness.store).await;

        let error = request(driver.id)
            .perform(&harness.app, &alice.session_user())
            .await
            .expect_error_json();

        assert_json_include!(actual: error, expected: json!({ "code": "access_denied" }));
        assert!(harness.documents.is_empty());
    }
}
