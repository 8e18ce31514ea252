use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Every failure the HTTP surface can report, in the order handlers
/// check them: identity, authorization, input, existence, conflict,
/// then everything upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// We don't know what is the cause of this error but the error we
    /// have in our server is reported in the logs. Collaborator
    /// failures (store, gateway, document store) end up here.
    Unknown,
    InvalidRequest,
    NotAuthenticated,
    AccessDenied,
    NotFound,
    /// The caller already holds the entitlement they are trying to
    /// purchase. Returned by checkout initiation only.
    AlreadyUnlocked,
}

impl ErrorCategory {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::InvalidRequest => "invalid_request",
            Self::NotAuthenticated => "not_authenticated",
            Self::AccessDenied => "access_denied",
            Self::NotFound => "not_found",
            Self::AlreadyUnlocked => "already_unlocked",
        }
    }

    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            // The original surface reported duplicate purchases as a
            // plain client error with its own code.
            Self::AlreadyUnlocked => StatusCode::BAD_REQUEST,
        }
    }

    #[must_use]
    pub const fn default_message(&self) -> &'static str {
        match self {
            Self::Unknown => "Unexpected error has occurred. Please try again later.",
            Self::InvalidRequest => "Invalid request.",
            Self::NotAuthenticated => "You must be logged in to do that.",
            Self::AccessDenied => "You do not have permission to access this information.",
            Self::NotFound => "Could not find the requested resource.",
            Self::AlreadyUnlocked => "You have already unlocked this driver.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_snake_case_wire_values() {
        assert_eq!(
            serde_json::to_string(&ErrorCategory::AlreadyUnlocked).unwrap(),
            "\"already_unlocked\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorCategory::NotAuthenticated).unwrap(),
            format!("\"{}\"", ErrorCategory::NotAuthenticated.code())
        );
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            ErrorCategory::NotAuthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCategory::AccessDenied.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCategory::AlreadyUnlocked.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCategory::Unknown.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
