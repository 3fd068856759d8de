//! API error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain_pricing::PricingError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiError::Pricing(e) if e.is_client_error() => (StatusCode::BAD_REQUEST, e.kind()),
            ApiError::Pricing(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.kind()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.parts();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let details = match &self {
            ApiError::Validation(message) => {
                Some(message.lines().map(str::to_string).collect())
            }
            _ => None,
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_pricing_errors_are_bad_requests() {
        let err = ApiError::from(PricingError::ServiceNotFound("T999".to_string()));
        assert_eq!(err.parts(), (StatusCode::BAD_REQUEST, "SERVICE_NOT_FOUND"));

        let err = ApiError::from(PricingError::InvalidCurrency("EUR".to_string()));
        assert_eq!(err.parts().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_engine_failures_are_server_errors() {
        let err = ApiError::from(PricingError::UnsupportedMode("charter".to_string()));
        assert_eq!(err.parts(), (StatusCode::INTERNAL_SERVER_ERROR, "UNSUPPORTED_MODE"));

        let err = ApiError::from(PricingError::Cancelled);
        assert_eq!(err.parts().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_status() {
        let response = ApiError::NotFound("T999".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
