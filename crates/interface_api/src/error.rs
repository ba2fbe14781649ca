//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;
use domain_billing::BillingError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone())
            }
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
            ApiError::Database(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", msg.clone())
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match &err {
            BillingError::StudentNotFound(_)
            | BillingError::InvoiceNotFound(_)
            | BillingError::PaymentNotFound(_) => ApiError::NotFound(err.to_string()),
            BillingError::InvalidAmount(_) | BillingError::Money(_) => {
                ApiError::Validation(err.to_string())
            }
            BillingError::DuplicateInvoiceNumber(_) => ApiError::Conflict(err.to_string()),
            BillingError::Store(port) => match port {
                PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
                PortError::Validation { .. } => ApiError::Validation(err.to_string()),
                PortError::Conflict { .. } => ApiError::Conflict(err.to_string()),
                PortError::Connection { .. } => ApiError::Database(err.to_string()),
                PortError::Internal { .. } => ApiError::Internal(err.to_string()),
            },
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::StudentId;

    #[test]
    fn test_missing_student_maps_to_not_found() {
        let err: ApiError = BillingError::StudentNotFound(StudentId::new()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_invalid_amount_maps_to_validation() {
        let err: ApiError = BillingError::InvalidAmount("negative".into()).into();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_duplicate_number_maps_to_conflict() {
        let err: ApiError = BillingError::DuplicateInvoiceNumber("INV-1".into()).into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }
}
