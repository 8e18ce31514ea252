use axum::extract::Multipart;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, ErrorCategory};
use crate::extract::{Json, SessionUser};
use crate::models::id::DriverId;
use crate::models::DriverType;
use crate::{services, App};

/// Body of `POST /admin/driver`, mirroring the admin dashboard form.
#[derive(Debug, Deserialize)]
pub struct CreateDriverRequest {
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
    pub phone: Option<String>,
    pub email: Option<String>,
    pub cdl_number: Option<String>,
}

pub async fn create_driver(
    app: App,
    user: SessionUser,
    Json(form): Json<CreateDriverRequest>,
) -> Result<Response, ApiError> {
    let (Some(first_name), Some(last_initial)) = (form.first_name, form.last_initial) else {
        return Err(ApiError::new(ErrorCategory::InvalidRequest)
            .message("Missing required identity fields"));
    };

    let request = services::admin::CreateDriver {
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
        phone: form.phone,
        email: form.email,
        cdl_number: form.cdl_number,
    };
    let created = request.perform(&app, &user).await?;

    Ok(Json(json!({ "ok": true, "id": created.id })).into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDriverRequest {
    pub driver_id: Option<DriverId>,
}

pub async fn delete_driver(
    app: App,
    user: SessionUser,
    Json(form): Json<DeleteDriverRequest>,
) -> Result<Response, ApiError> {
    let Some(driver_id) = form.driver_id else {
        return Err(ApiError::new(ErrorCategory::InvalidRequest).message("Missing Driver ID"));
    };

    let request = services::admin::DeleteDriver { driver_id };
    request.perform(&app, &user).await?;

    Ok(Json(json!({ "ok": true })).into_response())
}

/// `POST /admin/driver/cdl` takes multipart form data: a `driverId`
/// text field and the `file` itself.
pub async fn upload_cdl(
    app: App,
    user: SessionUser,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut driver_id: Option<DriverId> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(ErrorCategory::InvalidRequest).message(e.to_string()))?
    {
        match field.name() {
            Some("driverId") => {
                let text = field.text().await.map_err(|e| {
                    ApiError::new(ErrorCategory::InvalidRequest).message(e.to_string())
                })?;
                driver_id = text.parse().ok();
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        ApiError::new(ErrorCategory::InvalidRequest).message(e.to_string())
                    })?
                    .to_vec();
                file = Some((file_name, content_type, bytes));
            }
            _ => {}
        }
    }

    let (Some(driver_id), Some((file_name, content_type, bytes))) = (driver_id, file) else {
        return Err(
            ApiError::new(ErrorCategory::InvalidRequest).message("Missing driverId or file")
        );
    };

    let request = services::admin::UploadCdlDocument {
        driver_id,
        file_name,
        content_type,
        bytes,
    };
    let uploaded = request.perform(&app, &user).await?;

    Ok(Json(json!({ "ok": true, "path": uploaded.path })).into_response())
}
