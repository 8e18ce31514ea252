use crate::error::{ApiError, ErrorCategory};
use crate::extract::SessionUser;
use crate::models::id::DriverId;
use crate::models::{Driver, DriverStatus, Role};
use crate::store::Store;
use crate::App;

/// Availability toggle from the driver dashboard. Only the owning
/// driver (or an admin) may flip it.
#[derive(Debug)]
pub struct UpdateAvailability {
    pub driver_id: DriverId,
    pub status: DriverStatus,
}

impl UpdateAvailability {
    #[tracing::instrument(skip(app), name = "services.drivers.update_status")]
    pub async fn perform(self, app: &App, session_user: &SessionUser) -> Result<Driver, ApiError> {
        let Some(driver) = app.store.find_driver(self.driver_id).await? else {
            return Err(
                ApiError::new(ErrorCategory::NotFound).message("Could not find driver specified")
            );
        };

        let owns_listing = driver.user_id == Some(session_user.id);
        if !owns_listing {
            let role = app.store.get_profile_role(session_user.id).await?;
            if role != Some(Role::Admin) {
                return Err(ApiError::new(ErrorCategory::AccessDenied)
                    .message("You can only update your own listing."));
            }
        }

        let driver = app
            .store
            .update_driver_status(self.driver_id, self.status)
            .await?;

        tracing::info!(
            driver.id = %driver.id,
            status = ?driver.status,
            "Driver availability updated"
        );
        Ok(driver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InsertDriver;
    use crate::store::Store;
    use crate::test_utils::{self, TestResultExt};
    use assert_json_diff::assert_json_include;
    use serde_json::json;

    async fn seed_owned_driver(
        harness: &test_utils::TestHarness,
        owner: &test_utils::TestUser,
    ) -> Driver {
        harness
            .store
            .insert_driver(
                InsertDriver::builder()
                    .user_id(owner.id)
                    .first_name("Maria")
                    .last_initial("G")
                    .status(DriverStatus::Passive)
                    .build(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn owner_updates_their_status() {
        let harness = test_utils::build_test_app();
        let maria = test_utils::recruiter(&harness.app, "maria@example.com");
        let driver = seed_owned_driver(&harness, &maria).await;

        let request = UpdateAvailability {
            driver_id: driver.id,
            status: DriverStatus::Active,
        };
        let updated = request
            .perform(&harness.app, &maria.session_user())
            .await
            .unwrap();

        assert_eq!(updated.status, DriverStatus::Active);
    }

    #[tokio::test]
    async fn admin_may_update_any_listing() {
        let harness = test_utils::build_test_app();
        let maria = test_utils::recruiter(&harness.app, "maria@example.com");
        let root = test_utils::admin(&harness.app, &harness.store, "root@example.com").await;
        let driver = seed_owned_driver(&harness, &maria).await;

        let request = UpdateAvailability {
            driver_id: driver.id,
            status: DriverStatus::Unset,
        };
        let updated = request
            .perform(&harness.app, &root.session_user())
            .await
            .unwrap();

        assert_eq!(updated.status, DriverStatus::Unset);
    }

    #[tokio::test]
    async fn strangers_are_denied() {
        let harness = test_utils::build_test_app();
        let maria = test_utils::recruiter(&harness.app, "maria@example.com");
        let eve = test_utils::recruiter(&harness.app, "eve@example.com");
        let driver = seed_owned_driver(&harness, &maria).await;

        let request = UpdateAvailability {
            driver_id: driver.id,
            status: DriverStatus::Active,
        };
        let error = request
            .perform(&harness.app, &eve.session_user())
            .await
            .expect_error_json();

        assert_json_include!(
            actual: error,
            expected: json!({
                "code": "access_denied",
                "message": "You can only update your own listing.",
            }),
        );
    }
}
