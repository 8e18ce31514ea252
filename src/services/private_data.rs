use serde::Serialize;

use crate::error::{ApiError, ErrorCategory};
use crate::extract::SessionUser;
use crate::models::id::DriverId;
use crate::store::Store;
use crate::App;

#[derive(Debug)]
pub struct ViewPrivateData {
    pub driver_id: DriverId,
}

#[derive(Debug, Serialize)]
pub struct ContactBundle {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub cdl_number: Option<String>,
}

impl ViewPrivateData {
    /// Returns the private contact bundle if and only if the caller
    /// holds an unlock for this exact driver. Re-evaluated on every
    /// request; nothing here is a cacheable trust decision.
    #[tracing::instrument(skip(app), name = "services.private_data.view")]
    pub async fn perform(
        self,
        app: &App,
        session_user: &SessionUser,
    ) -> Result<ContactBundle, ApiError> {
        let unlocked = app
            .store
            .find_unlock(session_user.id, self.driver_id)
            .await?
            .is_some();

        if !unlocked {
            tracing::warn!(
                user.email = %session_user.email,
                driver.id = %self.driver_id,
                "Blocked private-data read without unlock"
            );
            return Err(ApiError::new(ErrorCategory::AccessDenied)
                .message("Access denied. Please purchase this profile first."));
        }

        let Some(private) = app.store.get_driver_private(self.driver_id).await? else {
            return Err(ApiError::new(ErrorCategory::NotFound)
                .message("No private record on file for this driver."));
        };

        Ok(ContactBundle {
            phone: private.phone,
            email: private.email,
            cdl_number: private.cdl_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, TestResultExt};
    use assert_json_diff::assert_json_include;
    use serde_json::json;

    #[tokio::test]
    async fn returns_bundle_for_unlocked_pair() {
        let harness = test_utils::build_test_app();
        let alice = test_utils::recruiter(&harness.app, "alice@example.com");
        let driver = test_utils::seed_driver_with_private(&harness.store).await;
        test_utils::seed_unlock(&harness.store, alice.id, driver.id).await;

        let request = ViewPrivateData {
            driver_id: driver.id,
        };
        let bundle = request
            .perform(&harness.app, &alice.session_user())
            .await
            .unwrap();

        assert_eq!(bundle.phone.as_deref(), Some("555-0100"));
        assert_eq!(bundle.email.as_deref(), Some("driver@example.com"));
        assert_eq!(bundle.cdl_number.as_deref(), Some("CDL-12345"));
    }

    #[tokio::test]
    async fn denies_without_unlock() {
        let harness = test_utils::build_test_app();
        let alice = test_utils::recruiter(&harness.app, "alice@example.com");
        let driver = test_utils::seed_driver_with_private(&harness.store).await;

        let request = ViewPrivateData {
            driver_id: driver.id,
        };
        let error = request
            .perform(&harness.app, &alice.session_user())
            .await
            .expect_error_json();

        assert_json_include!(
            actual: error,
            expected: json!({
                "code": "access_denied",
                "message": "Access denied. Please purchase this profile first.",
            }),
        );
    }

    #[tokio::test]
    async fn unlock_for_another_driver_does_not_leak() {
        let harness = test_utils::build_test_app();
        let alice = test_utils::recruiter(&harness.app, "alice@example.com");
        let unlocked = test_utils::seed_driver_with_private(&harness.store).await;
        let other = test_utils::seed_driver_with_private(&harness.store).await;
        test_utils::seed_unlock(&harness.store, alice.id, unlocked.id).await;

        let request = ViewPrivateData {
            driver_id: other.id,
        };
        let error = request
            .perform(&harness.app, &alice.session_user())
            .await
            .expect_error_json();

        assert_json_include!(
            actual: error,
            expected: json!({ "code": "access_denied" }),
        );
    }

    #[tokio::test]
    async fn missing_private_record_is_not_found() {
        let harness = test_utils::build_test_app();
        let alice = test_utils::recruiter(&harness.app, "alice@example.com");
        let driver = test_utils::seed_driver(&harness.store).await;
        test_utils::seed_unlock(&harness.store, alice.id, driver.id).await;

        let request = ViewPrivateData {
            driver_id: driver.id,
        };
        let error = request
            .perform(&harness.app, &alice.session_user())
            .await
            .expect_error_json();

        assert_json_include!(
            actual: error,
            expected: json!({
                "code": "not_found",
                "message": "No private record on file for this driver.",
            }),
        );
    }
}
