use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, ErrorCategory};
use crate::extract::{Json, SessionUser};
use crate::models::id::DriverId;
use crate::{services, App};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCheckoutRequest {
    pub driver_id: Option<DriverId>,
}

pub async fn start(
    app: App,
    user: SessionUser,
    Json(form): Json<StartCheckoutRequest>,
) -> Result<Response, ApiError> {
    let Some(driver_id) = form.driver_id else {
        return Err(ApiError::new(ErrorCategory::InvalidRequest)
            .message("Driver ID is required for checkout."));
    };

    let request = services::checkout::StartCheckout { driver_id };
    let redirect = request.perform(&app, &user).await?;

    Ok(Json(json!({ "url": redirect.url })).into_response())
}
