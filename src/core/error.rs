//! Error type system
//!
//! Tagged error variants with HTTP status mapping. Client-input errors (4xx)
//! surface their message verbatim; server faults (5xx) are rewritten by the
//! terminal error handler according to the runtime environment.

use crate::api::models::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Main error type for API Kit
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    // Individual validation failures are collected and joined into a single
    // comma-separated message.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type name for logs
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "InvalidRequest",
            ApiError::Validation(_) => "Validation",
            ApiError::Authentication(_) => "Authentication",
            ApiError::NotFound(_) => "NotFound",
            ApiError::RateLimited(_) => "RateLimited",
            ApiError::Internal(_) => "Internal",
        }
    }

    /// Client-input errors (4xx) as opposed to server faults (5xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Handlers surface `ApiError` through `IntoResponse`. The produced response
/// carries the error in its extensions so the pipeline's terminal error
/// handler can rewrite it with an incident id and the environment-dependent
/// message policy.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ApiResponse::error(self.to_string(), None));

        let mut response = (status, body).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Result type alias for operations that can fail with ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::InvalidRequest("test".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Authentication("test".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("test".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::RateLimited("test".into()).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Internal("test".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            ApiError::InvalidRequest("test".into()).error_type(),
            "InvalidRequest"
        );
        assert_eq!(ApiError::Internal("test".into()).error_type(), "Internal");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(ApiError::InvalidRequest("test".into()).is_client_error());
        assert!(ApiError::Authentication("test".into()).is_client_error());
        assert!(ApiError::RateLimited("test".into()).is_client_error());
        assert!(!ApiError::Internal("test".into()).is_client_error());
    }

    #[test]
    fn test_validation_errors_joined() {
        let error = ApiError::Validation(vec![
            "name is required".to_string(),
            "port must be a number".to_string(),
        ]);

        assert_eq!(
            error.to_string(),
            "name is required, port must be a number"
        );
    }

    #[test]
    fn test_into_response_stashes_error_in_extensions() {
        let response = ApiError::NotFound("no such book".into()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let stashed = response.extensions().get::<ApiError>();
        assert!(matches!(stashed, Some(ApiError::NotFound(_))));
    }
}
