use crate::error::{ApiError, ErrorCategory};
use crate::extract::SessionUser;
use crate::models::Role;
use crate::store::Store;
use crate::App;

mod create_driver;
mod delete_driver;
mod upload_document;

pub use create_driver::{CreateDriver, CreateDriverResult};
pub use delete_driver::DeleteDriver;
pub use upload_document::{UploadCdlDocument, UploadedDocument};

/// The single admin predicate: does the caller's profile carry the
/// admin role. Every privileged provisioning action goes through
/// here; recruiters and drivers get `AccessDenied`.
#[tracing::instrument(skip(app), name = "services.admin.ensure_admin")]
pub async fn ensure_admin(app: &App, session_user: &SessionUser) -> Result<(), ApiError> {
    let role = app.store.get_profile_role(session_user.id).await?;
    if role != Some(Role::Admin) {
        tracing::warn!(
            user.email = %session_user.email,
            "Blocked privileged action for non-admin user"
        );
        return Err(ApiError::new(ErrorCategory::AccessDenied).message("Admins only"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[tokio::test]
    async fn admits_admins_only() {
        let harness = test_utils::build_test_app();
        let alice = test_utils::recruiter(&harness.app, "alice@example.com");
        let root = test_utils::admin(&harness.app, &harness.store, "root@example.com").await;

        assert!(ensure_admin(&harness.app, &alice.session_user())
            .await
            .is_err());
        assert!(ensure_admin(&harness.app, &root.session_user())
            .await
            .is_ok());
    }
}
