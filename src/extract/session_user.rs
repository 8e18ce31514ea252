use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use crate::auth::SessionClaims;
use crate::error::{ApiError, ErrorCategory};
use crate::models::id::UserId;
use crate::App;

/// Identity of the authenticated caller, resolved by the auth
/// middleware from the bearer token. Rejects with 401 when the
/// request carried no (valid) credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
}

impl SessionUser {
    pub fn from_token(app: &App, token: &str) -> Result<Self, ApiError> {
        let claims = SessionClaims::decode(app, token)?;
        Ok(Self {
            id: claims.sub,
            email: claims.email,
        })
    }
}

#[axum::async_trait]
impl FromRequestParts<App> for SessionUser {
    type Rejection = Response;

    #[tracing::instrument(skip_all, name = "extractors.session_user")]
    async fn from_request_parts(parts: &mut Parts, _app: &App) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<SessionUser>() {
            Some(identity) => Ok(identity.clone()),
            None => Err(ApiError::new(ErrorCategory::NotAuthenticated).into_response()),
        }
    }
}
