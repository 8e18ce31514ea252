use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::ser::SerializeMap;
use serde::Serialize;
use std::fmt::Display;

mod category;
pub use category::ErrorCategory;

use crate::documents::DocumentError;
use crate::payments::PaymentError;
use crate::store::StoreError;

/// Error returned to API callers, serialized as `{"code", "message"}`.
///
/// Expected domain errors carry a user-actionable message; everything
/// unexpected is logged server-side and collapses into
/// [`ErrorCategory::Unknown`] so internals never leak to recruiters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ApiError {
    pub category: ErrorCategory,
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(category: ErrorCategory) -> Self {
        Self {
            category,
            message: None,
        }
    }

    pub fn unknown() -> Self {
        Self::new(ErrorCategory::Unknown)
    }

    pub fn message(self, message: impl Into<String>) -> Self {
        Self {
            category: self.category,
            message: Some(message.into()),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}): ", self.category.code())?;
        match &self.message {
            Some(message) => f.write_str(message),
            None => f.write_str(self.category.default_message()),
        }
    }
}

impl std::error::Error for ApiError {}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("code", self.category.code())?;
        map.serialize_entry(
            "message",
            self.message
                .as_deref()
                .unwrap_or_else(|| self.category.default_message()),
        )?;
        map.end()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.category.status_code(), Json(self)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        tracing::error!(%error, "Caught store error");
        Self::unknown()
    }
}

impl From<PaymentError> for ApiError {
    fn from(error: PaymentError) -> Self {
        match error {
            PaymentError::MissingSignature | PaymentError::InvalidSignature => {
                Self::new(ErrorCategory::InvalidRequest).message(error.to_string())
            }
            PaymentError::Provider(..) => {
                tracing::error!(%error, "Caught payment gateway error");
                Self::unknown()
            }
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(error: DocumentError) -> Self {
        match error {
            DocumentError::NotFound => {
                Self::new(ErrorCategory::NotFound).message("No document on file for this driver.")
            }
            DocumentError::Provider(..) => {
                tracing::error!(%error, "Caught document store error");
                Self::unknown()
            }
        }
    }
}
