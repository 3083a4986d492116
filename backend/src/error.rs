//! Error handling for the Solar Planner platform
//!
//! Provides consistent JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Webhook verification failed: {0}")]
    WebhookVerification(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("No address found for {0}")]
    LocationNotFound(String),

    // External service errors
    #[error("{service} error: {message}")]
    UpstreamService {
        service: &'static str,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl AppError {
    /// Upstream dependency failure
    pub fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        AppError::UpstreamService {
            service,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidToken | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::WebhookVerification(_)
            | AppError::Validation { .. }
            | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::LocationNotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::UpstreamService { .. } => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_)
            | AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        match field_errors.iter().next() {
            Some((field, errs)) => AppError::Validation {
                field: field.to_string(),
                message: errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field)),
            },
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_detail = match &self {
            AppError::InvalidToken => ErrorDetail::new("INVALID_TOKEN", "Invalid token"),
            AppError::Unauthorized(message) => ErrorDetail::new("UNAUTHORIZED", message.clone()),
            AppError::WebhookVerification(_) => {
                ErrorDetail::new("WEBHOOK_VERIFICATION_FAILED", "Webhook verification failed")
            }
            AppError::Validation { field, message } => ErrorDetail {
                code: "VALIDATION_ERROR".to_string(),
                message: message.clone(),
                field: Some(field.clone()),
            },
            AppError::ValidationError(msg) => ErrorDetail::new("VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(resource) => {
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource))
            }
            AppError::LocationNotFound(coordinates) => ErrorDetail::new(
                "LOCATION_NOT_FOUND",
                format!(
                    "Could not find an address for {}. Please enter correct coordinates.",
                    coordinates
                ),
            ),
            AppError::UpstreamService { service, message } => ErrorDetail::new(
                "UPSTREAM_SERVICE_ERROR",
                format!("{} error: {}", service, message),
            ),
            AppError::Configuration(msg) => {
                ErrorDetail::new("CONFIGURATION_ERROR", format!("Configuration error: {}", msg))
            }
            AppError::DatabaseError(_) => {
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred")
            }
        };

        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound("Plan".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::upstream("Weather archive", "timeout").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::WebhookVerification("bad signature".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::LocationNotFound("(0, 0)".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Configuration("missing key".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_errors_keep_field() {
        let input = shared::LocationInput {
            latitude: 19.0,
            longitude: 200.0,
        };
        let error: AppError = input.validate().unwrap_err().into();
        match error {
            AppError::Validation { field, message } => {
                assert_eq!(field, "longitude");
                assert_eq!(message, "Longitude must be between -180 and 180");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::NotFound("Weather record".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
