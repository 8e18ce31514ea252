use chrono::NaiveDate;

use crate::error::{ApiError, ErrorCategory};
use crate::extract::SessionUser;
use crate::models::id::DriverId;
use crate::models::{DriverStatus, DriverType, InsertDriver, InsertDriverPrivate};
use crate::services::util::{normalize, normalize_lower, normalize_upper};
use crate::store::Store;
use crate::App;

/// Self-service listing creation by the driver themself, one listing
/// per account. Same two-table write as admin provisioning, with the
/// same compensating rollback.
#[derive(Debug)]
pub struct RegisterDriver {
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
    pub status: DriverStatus,

    pub phone: Option<String>,
    pub cdl_number: Option<String>,
}

#[derive(Debug)]
pub struct RegisterDriverResult {
    pub id: DriverId,
}

impl RegisterDriver {
    #[tracing::instrument(skip(app), name = "services.drivers.register")]
    pub async fn perform(
        self,
        app: &App,
        session_user: &SessionUser,
    ) -> Result<RegisterDriverResult, ApiError> {
        let existing = app.store.find_driver_by_owner(session_user.id).await?;
        if existing.is_some() {
            return Err(ApiError::new(ErrorCategory::InvalidRequest)
                .message("You already have a driver profile."));
        }

        let first_name = self.first_name.trim();
        let last_initial = self.last_initial.trim().to_uppercase();
        if first_name.is_empty() || last_initial.is_empty() {
            return Err(ApiError::new(ErrorCategory::InvalidRequest)
                .message("Missing required identity fields"));
        }

        let driver = InsertDriver::builder()
            .user_id(session_user.id)
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
            .status(self.status)
            .build();

        let driver = app.store.insert_driver(driver).await?;

        let private = InsertDriverPrivate::builder()
            .driver_id(driver.id)
            .maybe_phone(normalize(self.phone))
            .maybe_email(normalize_lower(Some(session_user.email.clone())))
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

            return Err(ApiError::unknown());
        }

        tracing::info!(
            user.email = %session_user.email,
            driver.id = %driver.id,
            "Driver registered their listing"
        );

        Ok(RegisterDriverResult { id: driver.id })
    }
}
