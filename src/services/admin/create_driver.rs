use chrono::NaiveDate;

use crate::error::{ApiError, ErrorCategory};
use crate::extract::SessionUser;
use crate::models::id::DriverId;
use crate::models::{DriverType, InsertDriver, InsertDriverPrivate};
use crate::services::util::{normalize, normalize_lower, normalize_upper};
use crate::store::Store;
use crate::App;

#[derive(Debug)]
pub struct CreateDriver {
    pub first_name: String,
    pub last_initial: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub living_city: Option<String>,
    pub living_state: Option<String>,
    pub dob: Option<NaiveDate>,
    pub driver_type: DriverType,
    pub experience_years: i32,
    pub endorsements: Vec<String>,

    pub phone: Option<String>,
    pub email: Option<String>,
    pub cdl_number: Option<String>,
}

#[derive(Debug)]
pub struct CreateDriverResult {
    pub id: DriverId,
}

impl CreateDriver {
    /// Provisions the public listing and its private bundle together.
    ///
    /// The two inserts are transactional by convention: if the
    /// private insert fails after the public one succeeded, the
    /// public record is deleted again rather than left orphaned.
    #[tracing::instrument(skip(app), name = "services.admin.create_driver")]
    pub async fn perform(
        self,
        app: &App,
        session_user: &SessionUser,
    ) -> Result<CreateDriverResult, ApiError> {
        super::ensure_admin(app, session_user).await?;

        let first_name = self.first_name.trim();
        let last_initial = self.last_initial.trim().to_uppercase();
        if first_name.is_empty() || last_initial.is_empty() {
            return Err(ApiError::new(ErrorCategory::InvalidRequest)
                .message("Missing required identity fields"));
        }

        let driver = InsertDriver::builder()
            .first_name(first_name)
            .last_initial(last_initial)
            .maybe_city(normalize(self.city))
            .maybe_state(normalize_upper(self.state))
            .maybe_living_city(normalize(self.living_city))
            .maybe_living_state(normalize_upper(self.living_state))
            .maybe_dob(self.dob)
            .driver_type(self.driver_type)
            .experience_years(self.experience_years.max(0))
            .endorsements(self.endorsements)
            .build();

        let driver = app.store.insert_driver(driver).await?;

        let private = InsertDriverPrivate::builder()
            .driver_id(driver.id)
            .maybe_phone(normalize(self.phone))
            .maybe_email(normalize_lower(self.email))
            .maybe_cdl_number(normalize(self.cdl_number))
            .build();

        if let Err(error) = app.store.insert_driver_private(private).await {
            tracing::error!(
                %error,
                driver.id = %driver.id,
                "Failed to create private driver record, rolling back public record"
            );

            if let Err(rollback_error) = app.store.delete_driver(driver.id).await {
                tracing::error!(
                    error = %rollback_error,
                    driver.id = %driver.id,
                    "Rollback of public driver record failed"
                );
            }

            // Admin tooling, so the raw dependency message is fine.
            return Err(ApiError::new(ErrorCategory::InvalidRequest)
                .message(format!("Private data error: {error}")));
        }

        tracing::info!(
            user.email = %session_user.email,
            driver.id = %driver.id,
            "Admin created driver"
        );

        Ok(CreateDriverResult { id: driver.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use crate::test_utils::{self, TestResultExt};
    use assert_json_diff::assert_json_include;
    use serde_json::json;

    fn request() -> CreateDriver {
        CreateDriver {
            first_name: " Joe ".into(),
            last_initial: "d".into(),
            city: Some("Dallas".into()),
            state: Some("tx".into()),
            living_city: None,
            living_state: Some(" ".into()),
            dob: None,
            driver_type: DriverType::OwnerOperator,
            experience_years: 7,
            endorsements: vec!["hazmat".into()],
            phone: Some("555-0100".into()),
            email: Some("Joe@Example.com".into()),
            cdl_number: Some("CDL-1".into()),
        }
    }

    #[tokio::test]
    async fn creates_both_records_normalized() {
        let harness = test_utils::build_test_app();
        let root = test_utils::admin(&harness.app, &harness.store, "root@example.com").await;

        let result = request()
            .perform(&harness.app, &root.session_user())
            .await
            .unwrap();

        let driver = harness
            .store
            .find_driver(result.id)
            .await
            .unwrap()
            .expect("driver should exist");
        assert_eq!(driver.first_name, "Joe");
        assert_eq!(driver.last_initial, "D");
        assert_eq!(driver.state.as_deref(), Some("TX"));
        assert_eq!(driver.living_state, None);
        assert_eq!(driver.user_id, None);

        let private = harness
            .store
            .get_driver_private(result.id)
            .await
            .unwrap()
            .expect("private bundle should exist");
        assert_eq!(private.email.as_deref(), Some("joe@example.com"));
        assert_eq!(private.cdl_number.as_deref(), Some("CDL-1"));
    }

    #[tokio::test]
    async fn rejects_non_admin() {
        let harness = test_utils::build_test_app();
        let alice = test_utils::recruiter(&harness.app, "alice@example.com");

        let error = request()
            .perform(&harness.app, &alice.session_user())
            .await
            .expect_error_json();

        assert_json_include!(
            actual: error,
            expected: json!({
                "code": "access_denied",
                "message": "Admins only",
            }),
        );
    }

    #[tokio::test]
    async fn rejects_missing_identity_fields() {
        let harness = test_utils::build_test_app();
        let root = test_utils::admin(&harness.app, &harness.store, "root@example.com").await;

        let mut incomplete = request();
        incomplete.last_initial = "  ".into();

        let error = incomplete
            .perform(&harness.app, &root.session_user())
            .await
            .expect_error_json();

        assert_json_include!(
            actual: error,
            expected: json!({
                "code": "invalid_request",
                "message": "Missing required identity fields",
            }),
        );
    }

    #[tokio::test]
    async fn rolls_back_public_record_when_private_insert_fails() {
        let harness = test_utils::build_test_app();
        let root = test_utils::admin(&harness.app, &harness.store, "root@example.com").await;

        harness.store.fail_private_inserts(true);
        let error = request()
            .perform(&harness.app, &root.session_user())
            .await
            .expect_error_json();
        harness.store.fail_private_inserts(false);

        assert_json_include!(
            actual: error,
            expected: json!({ "code": "invalid_request" }),
        );

        // The orphaned public record must be gone again.
        let drivers = harness
            .store
            .list_drivers(&Default::default())
            .await
            .unwrap();
        assert!(drivers.is_empty());
    }
}
