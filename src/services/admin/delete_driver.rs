use crate::error::{ApiError, ErrorCategory};
use crate::extract::SessionUser;
use crate::models::id::DriverId;
use crate::store::Store;
use crate::App;

#[derive(Debug)]
pub struct DeleteDriver {
    pub driver_id: DriverId,
}

impl DeleteDriver {
    /// Removes a listing entirely. The store cascades the private
    /// bundle and any unlocks pointing at the driver.
    #[tracing::instrument(skip(app), name = "services.admin.delete_driver")]
    pub async fn perform(self, app: &App, session_user: &SessionUser) -> Result<(), ApiError> {
        super::ensure_admin(app, session_user).await?;

        if !app.store.delete_driver(self.driver_id).await? {
            return Err(
                ApiError::new(ErrorCategory::NotFound).message("Could not find driver specified")
            );
        }

        tracing::info!(
            user.email = %session_user.email,
            driver.id = %self.driver_id,
            "Admin deleted driver"
        );
        Ok(())
    }
}
