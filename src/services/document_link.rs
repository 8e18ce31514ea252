use std::time::Duration;
use url::Url;

use crate::error::{ApiError, ErrorCategory};
use crate::extract::SessionUser;
use crate::documents::DocumentStore;
use crate::models::id::DriverId;
use crate::store::Store;
use crate::App;

#[derive(Debug)]
pub struct IssueDocumentLink {
    pub driver_id: DriverId,
}

#[derive(Debug)]
pub struct DocumentLink {
    pub url: Url,
}

impl IssueDocumentLink {
    /// Issues a short-lived signed URL for the driver's CDL document.
    ///
    /// The document never gets a durable URL: every request re-proves
    /// the unlock and re-derives a link that the store itself expires
    /// shortly after.
    #[tracing::instrument(skip(app), name = "services.documents.issue_link")]
    pub async fn perform(
        self,
        app: &App,
        session_user: &SessionUser,
    ) -> Result<DocumentLink, ApiError> {
        let unlocked = app
            .store
            .find_unlock(session_user.id, self.driver_id)
            .await?
            .is_some();

        if !unlocked {
            tracing::warn!(
                user.email = %session_user.email,
                driver.id = %self.driver_id,
                "Blocked document download without unlock"
            );
            return Err(ApiError::new(ErrorCategory::AccessDenied)
                .message("Access denied. Please purchase this profile first."));
        }

        let Some(private) = app.store.get_driver_private(self.driver_id).await? else {
            return Err(ApiError::new(ErrorCategory::NotFound)
                .message("No private record on file for this driver."));
        };

        let Some(path) = private.cdl_file_path else {
            return Err(ApiError::new(ErrorCategory::NotFound)
                .message("No document on file for this driver."));
        };

        let ttl = Duration::from_secs(app.config.storage.signed_url_ttl_secs);
        let url = app.documents.sign(&path, ttl).await?;

        tracing::info!(
            user.email = %session_user.email,
            driver.id = %self.driver_id,
            "Issued secure document link"
        );

        Ok(DocumentLink { url })
    }
}
