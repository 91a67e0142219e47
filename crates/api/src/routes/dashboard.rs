use std::sync::Arc;

use axum::extract::State;
use domain::OrderStats;
use store::Store;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/admin/dashboard/stats
pub async fn stats<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<ApiResponse<OrderStats>, ApiError> {
    Ok(ApiResponse::ok(state.dashboard.stats().await?))
}
