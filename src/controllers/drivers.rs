use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, ErrorCategory};
use crate::extract::{Json, SessionUser};
use crate::models::id::DriverId;
use crate::models::{DriverFilter, DriverStatus, DriverType};
use crate::store::Store;
use crate::{services, App};

/// Public listing with exact-match filters, e.g.
/// `GET /drivers?state=TX&driver_type=owner_operator`.
pub async fn list(app: App, Query(filter): Query<DriverFilter>) -> Result<Response, ApiError> {
    let drivers = app.store.list_drivers(&filter).await?;
    Ok(Json(drivers).into_response())
}

pub async fn get(app: App, Path(driver_id): Path<DriverId>) -> Result<Response, ApiError> {
    let Some(driver) = app.store.find_driver(driver_id).await? else {
        return Err(
            ApiError::new(ErrorCategory::NotFound).message("Could not find driver specified")
        );
    };

    Ok(Json(driver).into_response())
}

/// Body of `POST /drivers`, mirroring the self-service join form.
#[derive(Debug, Deserialize)]
pub struct RegisterDriverRequest {
    pub first_name: Option<String>,
    pub last_initial: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub living_city: Option<String>,
    pub living_state: Option<String>,
    pub dob: Option<NaiveDate>,
    pub driver_type: Option<DriverType>,
    pub experience_years: Option<i32>,
    pub endorsements: Option<Vec<String>>,
    pub status: Option<DriverStatus>,
    pub phone: Option<String>,
    pub cdl_number: Option<String>,
}

pub async fn register(
    app: App,
    user: SessionUser,
    Json(form): Json<RegisterDriverRequest>,
) -> Result<Response, ApiError> {
    let (Some(first_name), Some(last_initial)) = (form.first_name, form.last_initial) else {
        return Err(ApiError::new(ErrorCategory::InvalidRequest)
            .message("Missing required identity fields"));
    };

    let request = services::drivers::RegisterDriver {
        first_name,
        last_initial,
        city: form.city,
        state: form.state,
        living_city: form.living_city,
        living_state: form.living_state,
        dob: form.dob,
        driver_type: form.driver_type.unwrap_or(DriverType::Company),
        experience_years: form.experience_years.unwrap_or(0),
        endorsements: form.endorsements.unwrap_or_default(),
        status: form.status.unwrap_or_default(),
        phone: form.phone,
        cdl_number: form.cdl_number,
    };
    let registered = request.perform(&app, &user).await?;

    Ok(Json(json!({ "ok": true, "id": registered.id })).into_response())
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<DriverStatus>,
}

pub async fn update_status(
    app: App,
    user: SessionUser,
    Path(driver_id): Path<DriverId>,
    Json(form): Json<UpdateStatusRequest>,
) -> Result<Response, ApiError> {
    let Some(status) = form.status else {
        return Err(ApiError::new(ErrorCategory::InvalidRequest).message("Missing status"));
    };

    let request = services::drivers::UpdateAvailability { driver_id, status };
    let driver = request.perform(&app, &user).await?;

    Ok(Json(driver).into_response())
}
