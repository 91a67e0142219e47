//! HTTP route handlers.

pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod menus;
pub mod metrics;
pub mod orders;

use crate::error::ApiError;

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}
