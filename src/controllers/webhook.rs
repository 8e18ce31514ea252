use axum::body::Bytes;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::ApiError;
use crate::extract::Json;
use crate::{services, App};

/// Gateway-facing endpoint: no user auth, authenticated solely by the
/// signature over the raw body. Responds with plain status codes the
/// gateway's retry policy understands.
pub async fn receive(app: App, headers: HeaderMap, body: Bytes) -> Result<Response, ApiError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    let request = services::webhook::ProcessPaymentEvent {
        payload: body.to_vec(),
        signature,
    };
    request.perform(&app).await?;

    Ok(Json(json!({ "received": true })).into_response())
}
