use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, ErrorCategory};
use crate::extract::{Json, SessionUser};
use crate::models::id::DriverId;
use crate::{services, App};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLinkRequest {
    pub driver_id: Option<DriverId>,
}

pub async fn issue_link(
    app: App,
    user: SessionUser,
    Json(form): Json<DocumentLinkRequest>,
) -> Result<Response, ApiError> {
    let Some(driver_id) = form.driver_id else {
        return Err(ApiError::new(ErrorCategory::InvalidRequest).message("Missing Driver ID"));
    };

    let request = services::document_link::IssueDocumentLink { driver_id };
    let link = request.perform(&app, &user).await?;

    Ok(Json(json!({ "url": link.url })).into_response())
}
