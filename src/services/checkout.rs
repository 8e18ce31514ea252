use crate::error::{ApiError, ErrorCategory};
use crate::extract::SessionUser;
use crate::models::id::DriverId;
use crate::payments::{CheckoutParams, PaymentGateway};
use crate::store::Store;
use crate::App;

#[derive(Debug)]
pub struct StartCheckout {
    pub driver_id: DriverId,
}

#[derive(Debug)]
pub struct CheckoutRedirect {
    /// Opaque URL of the hosted payment page.
    pub url: String,
}

impl StartCheckout {
    /// Opens a payment session for one driver unlock.
    ///
    /// The existing-unlock guard is a UX optimization against
    /// obviously-redundant checkouts; the uniqueness constraint on
    /// the unlocks table is what actually prevents duplicate grants
    /// when two sessions race.
    #[tracing::instrument(skip(app), name = "services.checkout.start")]
    pub async fn perform(
        self,
        app: &App,
        session_user: &SessionUser,
    ) -> Result<CheckoutRedirect, ApiError> {
        let existing = app
            .store
            .find_unlock(session_user.id, self.driver_id)
            .await?;

        if existing.is_some() {
            return Err(ApiError::new(ErrorCategory::AlreadyUnlocked));
        }

        let Some(driver) = app.store.find_driver(self.driver_id).await? else {
            return Err(
                ApiError::new(ErrorCategory::NotFound).message("Could not find driver specified")
            );
        };

        let base = app.config.site_url.as_str().trim_end_matches('/');
        let params = CheckoutParams {
            customer_email: session_user.email.clone(),
            user_id: session_user.id,
            driver_id: driver.id,
            success_url: format!("{base}/drivers/{}?paid=1", driver.id),
            cancel_url: format!("{base}/drivers/{}?canceled=1", driver.id),
        };

        tracing::info!(
            user.email = %session_user.email,
            driver.id = %driver.id,
            "Initiating checkout"
        );

        let session = app.payments.create_checkout_session(&params).await?;
        Ok(CheckoutRedirect {
            url: session.checkout_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, TestResultExt};
    use assert_json_diff::assert_json_include;
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn opens_session_with_unlock_metadata() {
        let harness = test_utils::build_test_app();
        let alice = test_utils::recruiter(&harness.app, "alice@example.com");
        let driver = test_utils::seed_driver(&harness.store).await;

        let request = StartCheckout {
            driver_id: driver.id,
        };
        let redirect = request
            .perform(&harness.app, &alice.session_user())
            .await
            .unwrap();

        assert!(redirect.url.contains(&driver.id.to_string()));

        let sessions = harness.payments.created_sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].user_id, alice.id);
        assert_eq!(sessions[0].driver_id, driver.id);
        assert_eq!(sessions[0].customer_email, "alice@example.com");
        assert!(sessions[0].success_url.ends_with("?paid=1"));
        assert!(sessions[0].cancel_url.ends_with("?canceled=1"));
    }

    #[tokio::test]
    async fn rejects_duplicate_purchase_without_new_session() {
        let harness = test_utils::build_test_app();
        let alice = test_utils::recruiter(&harness.app, "alice@example.com");
        let driver = test_utils::seed_driver(&harness.store).await;
        test_utils::seed_unlock(&harness.store, alice.id, driver.id).await;

        let request = StartCheckout {
            driver_id: driver.id,
        };
        let error = request
            .perform(&harness.app, &alice.session_user())
            .await
            .expect_error_json();

        assert_json_include!(
            actual: error,
            expected: json!({
                "code": "already_unlocked",
            }),
        );
        assert!(harness.payments.created_sessions().is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_driver() {
        let harness = test_utils::build_test_app();
        let alice = test_utils::recruiter(&harness.app, "alice@example.com");

        let request = StartCheckout {
            driver_id: crate::models::id::DriverId(Uuid::new_v4()),
        };
        let error = request
            .perform(&harness.app, &alice.session_user())
            .await
            .expect_error_json();

        assert_json_include!(
            actual: error,
            expected: json!({
                "code": "not_found",
                "message": "Could not find driver specified",
            }),
        );
        assert!(harness.payments.created_sessions().is_empty());
    }
}
