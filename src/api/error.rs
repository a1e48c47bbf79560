// src/api/error.rs
// Centralized error handling for HTTP API responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tracing::error;

use crate::error::{FieldErrors, LocateError, NotFoundError, RepoError};
use crate::geocoding::GeocodeError;

/// Standard API error response.
///
/// With `field_errors` set the body is `{"errors": {field: [messages]}}`,
/// otherwise `{"error": true, "message", "status", "error_code"}`.
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
    pub error_code: Option<String>,
    pub field_errors: Option<FieldErrors>,
}

impl ApiError {
    fn new(status_code: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
            error_code: Some(code.to_string()),
            field_errors: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "BAD_GATEWAY", message)
    }

    /// Field-keyed errors with an explicit status.
    pub fn fields(status_code: StatusCode, errors: FieldErrors) -> Self {
        Self {
            message: errors.to_string(),
            status_code,
            error_code: None,
            field_errors: Some(errors),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Some(errors) = self.field_errors {
            return (self.status_code, Json(json!({ "errors": errors.as_map() }))).into_response();
        }

        let mut response_json = json!({
            "error": true,
            "message": self.message,
            "status": self.status_code.as_u16()
        });

        if let Some(error_code) = self.error_code {
            response_json["error_code"] = json!(error_code);
        }

        (self.status_code, Json(response_json)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl From<NotFoundError> for ApiError {
    fn from(err: NotFoundError) -> Self {
        ApiError::fields(StatusCode::NOT_FOUND, FieldErrors::single(err.field, err.message))
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { entity, id } => ApiError::not_found(format!("{entity} {id} not found")),
            RepoError::Validation(errors) => ApiError::fields(StatusCode::UNPROCESSABLE_ENTITY, errors),
            RepoError::Database(e) => db_error("request", e),
        }
    }
}

impl From<LocateError> for ApiError {
    fn from(err: LocateError) -> Self {
        match err {
            LocateError::NotFound(e) => e.into(),
            LocateError::Repo(e) => e.into(),
        }
    }
}

impl From<GeocodeError> for ApiError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NoResults => NotFoundError::ADDRESS.into(),
            other => {
                error!("Geocoding failed: {:?}", other);
                ApiError::bad_gateway("Geocoding service unavailable")
            }
        }
    }
}

/// Helper function for database operation errors
pub fn db_error(operation: &str, error: impl std::fmt::Debug) -> ApiError {
    let message = format!("Database error during {operation}");
    error!("{}: {:?}", message, error);
    ApiError::internal(message)
}
