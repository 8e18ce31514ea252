use chrono::{TimeDelta, Utc};
use jsonwebtoken::{
    errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ErrorCategory};
use crate::models::id::UserId;
use crate::App;

static JWT_SESSION_ISSUER: &str = "driver-leads.api.session";

/// Claims of a recruiter/driver session token. The token itself is
/// the identity resolution: `sub` and `email` are trusted once the
/// signature and time window check out, with no store round-trip.
#[derive(Debug, Deserialize, Serialize)]
pub struct SessionClaims {
    pub nbf: i64,
    pub exp: i64,
    pub iss: String,
    pub sub: UserId,

    pub email: String,
}

impl SessionClaims {
    pub fn decode(app: &App, token: &str) -> Result<Self, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_issuer(&[JWT_SESSION_ISSUER]);

        let key = DecodingKey::from_secret(app.config.jwt_secret.as_bytes());
        let token = token.replace(char::is_whitespace, "");

        match jsonwebtoken::decode::<Self>(&token, &key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(error) => match error.kind() {
                ErrorKind::ExpiredSignature => Err(ApiError::new(
                    ErrorCategory::NotAuthenticated,
                )
                .message("Your session has expired. Please log in again.")),
                ErrorKind::InvalidToken
                | ErrorKind::InvalidIssuer
                | ErrorKind::InvalidSignature
                | ErrorKind::ImmatureSignature => {
                    Err(ApiError::new(ErrorCategory::NotAuthenticated))
                }
                _ => {
                    tracing::error!(%error, "Could not decode session token");
                    Err(ApiError::unknown())
                }
            },
        }
    }

    pub fn encode(&self, app: &App) -> Result<String, ApiError> {
        let key = EncodingKey::from_secret(app.config.jwt_secret.as_bytes());
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), self, &key).map_err(|error| {
            tracing::error!(%error, "Could not encode session token");
            ApiError::unknown()
        })
    }

    #[must_use]
    pub fn generate(user_id: UserId, email: &str) -> Self {
        let now = Utc::now();
        Self {
            nbf: now.timestamp(),
            exp: (now + TimeDelta::days(1)).timestamp(),
            iss: JWT_SESSION_ISSUER.to_string(),
            sub: user_id,

            email: email.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use uuid::Uuid;

    #[tokio::test]
    async fn round_trips_claims() {
        let harness = test_utils::build_test_app();
        let user_id = UserId(Uuid::new_v4());

        let token = SessionClaims::generate(user_id, "recruiter@example.com")
            .encode(&harness.app)
            .unwrap();

        let claims = SessionClaims::decode(&harness.app, &token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "recruiter@example.com");
    }

    #[tokio::test]
    async fn rejects_garbage_tokens() {
        let harness = test_utils::build_test_app();

        let error = SessionClaims::decode(&harness.app, "not-a-token").unwrap_err();
        assert_eq!(error.category, ErrorCategory::NotAuthenticated);
    }

    #[tokio::test]
    async fn rejects_expired_tokens() {
        let harness = test_utils::build_test_app();
        let user_id = UserId(Uuid::new_v4());

        let mut claims = SessionClaims::generate(user_id, "recruiter@example.com");
        claims.nbf -= 7200;
        claims.exp = claims.nbf + 60;

        let token = claims.encode(&harness.app).unwrap();
        let error = SessionClaims::decode(&harness.app, &token).unwrap_err();
        assert_eq!(error.category, ErrorCategory::NotAuthenticated);
    }
}
