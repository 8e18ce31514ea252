use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::error::{ApiError, ErrorCategory};
use crate::extract::{Json, SessionUser};
use crate::models::id::DriverId;
use crate::{services, App};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateDataRequest {
    pub driver_id: Option<DriverId>,
}

pub async fn view(
    app: App,
    user: SessionUser,
    Json(form): Json<PrivateDataRequest>,
) -> Result<Response, ApiError> {
    let Some(driver_id) = form.driver_id else {
        return Err(ApiError::new(ErrorCategory::InvalidRequest).message("Missing Driver ID"));
    };

    let request = services::private_data::ViewPrivateData { driver_id };
    let bundle = request.perform(&app, &user).await?;

    Ok(Json(bundle).into_response())
}
