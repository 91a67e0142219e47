//! Admin stock endpoints.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use common::MenuId;
use domain::{InventoryLevel, StockAdjustPayload, StockLevel, StockUpdatePayload};
use store::Store;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Reads an adjustment body; an empty body means the default amount.
fn adjustment(body: &Bytes) -> Result<StockAdjustPayload, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(StockAdjustPayload::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| ApiError::Validation(vec![format!("invalid request body: {err}")]))
}

/// GET /api/admin/inventory
pub async fn list<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<ApiResponse<Vec<InventoryLevel>>, ApiError> {
    Ok(ApiResponse::ok(state.inventory.list().await?))
}

/// PATCH /api/admin/inventory/{menuId}/increase
#[tracing::instrument(skip(state, path, body))]
pub async fn increase<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    path: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<ApiResponse<StockLevel>, ApiError> {
    let Path(menu_id) = path?;
    let amount = adjustment(&body)?.into_amount()?;
    let level = state.inventory.increase(MenuId::new(menu_id), amount).await?;
    Ok(ApiResponse::ok(level))
}

/// PATCH /api/admin/inventory/{menuId}/decrease
#[tracing::instrument(skip(state, path, body))]
pub async fn decrease<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    path: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<ApiResponse<StockLevel>, ApiError> {
    let Path(menu_id) = path?;
    let amount = adjustment(&body)?.into_amount()?;
    let level = state.inventory.decrease(MenuId::new(menu_id), amount).await?;
    Ok(ApiResponse::ok(level))
}

/// PUT /api/admin/inventory/{menuId}
#[tracing::instrument(skip(state, path, body))]
pub async fn set<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<StockUpdatePayload>, JsonRejection>,
) -> Result<ApiResponse<StockLevel>, ApiError> {
    let Path(menu_id) = path?;
    let Json(payload) = body?;
    let stock = payload.into_stock()?;
    let level = state.inventory.set(MenuId::new(menu_id), stock).await?;
    Ok(ApiResponse::ok(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_adjustment_body_uses_default_amount() {
        let payload = adjustment(&Bytes::new()).unwrap();
        assert_eq!(payload.amount_or_default(), 1);
    }

    #[test]
    fn adjustment_body_is_parsed() {
        let payload = adjustment(&Bytes::from_static(br#"{"amount": 5}"#)).unwrap();
        assert_eq!(payload.amount, Some(5));
    }

    #[test]
    fn malformed_adjustment_body_is_a_validation_error() {
        let err = adjustment(&Bytes::from_static(b"{amount")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
