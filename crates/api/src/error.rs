//! API error types with HTTP response mapping.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::ValidationReport;
use ordering::ServiceError;
use store::StoreError;
use thiserror::Error;

use crate::response;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A service call failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The request could not be read or failed validation.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    /// No route matched.
    #[error("the requested resource was not found")]
    RouteNotFound,
}

impl From<ValidationReport> for ApiError {
    fn from(report: ValidationReport) -> Self {
        ApiError::Validation(report.into_errors())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(vec![rejection.body_text()])
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(vec![rejection.body_text()])
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(vec![rejection.body_text()])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => response::failure(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                errors.join(", "),
                None,
            ),
            ApiError::RouteNotFound => response::failure(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                self.to_string(),
                None,
            ),
            ApiError::Service(err) => service_error_to_response(err),
        }
    }
}

fn service_error_to_response(err: ServiceError) -> Response {
    let message = err.to_string();
    match err {
        ServiceError::Validation(_) => {
            response::failure(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message, None)
        }
        ServiceError::NotFound(_) => {
            response::failure(StatusCode::NOT_FOUND, "NOT_FOUND", message, None)
        }
        ServiceError::InsufficientStock(shortfalls) => response::failure(
            StatusCode::BAD_REQUEST,
            "INSUFFICIENT_STOCK",
            message,
            serde_json::to_value(shortfalls).ok(),
        ),
        ServiceError::InvalidStatusTransition { from, to } => response::failure(
            StatusCode::BAD_REQUEST,
            "INVALID_STATUS_TRANSITION",
            message,
            Some(serde_json::json!({ "from": from, "to": to })),
        ),
        ServiceError::EmptyOrder => {
            response::failure(StatusCode::BAD_REQUEST, "INVALID_ORDER", message, None)
        }
        ServiceError::DuplicateMenu => {
            response::failure(StatusCode::CONFLICT, "DUPLICATE_MENU", message, None)
        }
        ServiceError::MenuInUse => {
            response::failure(StatusCode::CONFLICT, "MENU_IN_USE", message, None)
        }
        ServiceError::Store(err) => store_error_to_response(err),
    }
}

fn store_error_to_response(err: StoreError) -> Response {
    match err {
        StoreError::UniqueViolation { constraint } => response::failure(
            StatusCode::CONFLICT,
            "DUPLICATE_ENTRY",
            "duplicate data".to_string(),
            Some(serde_json::json!({ "constraint": constraint })),
        ),
        StoreError::ForeignKeyViolation { constraint } => response::failure(
            StatusCode::CONFLICT,
            "FOREIGN_KEY_VIOLATION",
            "related data exists".to_string(),
            Some(serde_json::json!({ "constraint": constraint })),
        ),
        StoreError::CheckViolation { constraint } => response::failure(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "data constraint violated".to_string(),
            Some(serde_json::json!({ "constraint": constraint })),
        ),
        StoreError::Unavailable(reason) => {
            tracing::error!(error = %reason, "database unavailable");
            response::failure(
                StatusCode::SERVICE_UNAVAILABLE,
                "DATABASE_CONNECTION_ERROR",
                "failed to connect to the database".to_string(),
                None,
            )
        }
        other => {
            tracing::error!(error = %other, "internal server error");
            response::failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".to_string(),
                None,
            )
        }
    }
}
