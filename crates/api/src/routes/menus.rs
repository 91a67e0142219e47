//! Menu catalog endpoints, public reads and admin writes.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use common::MenuId;
use domain::{Menu, MenuPayload, MenuUpdatePayload};
use store::Store;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/menus
pub async fn list<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<ApiResponse<Vec<Menu>>, ApiError> {
    Ok(ApiResponse::ok(state.menus.list_menus().await?))
}

/// GET /api/menus/{id}
pub async fn get<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<Menu>, ApiError> {
    let Path(id) = path?;
    Ok(ApiResponse::ok(state.menus.get_menu(MenuId::new(id)).await?))
}

/// POST /api/admin/menus
#[tracing::instrument(skip(state, body))]
pub async fn create<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<MenuPayload>, JsonRejection>,
) -> Result<ApiResponse<Menu>, ApiError> {
    let Json(payload) = body?;
    let menu = state.menus.create_menu(payload).await?;
    Ok(ApiResponse::created(menu))
}

/// PUT /api/admin/menus/{id}
#[tracing::instrument(skip(state, path, body))]
pub async fn update<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<MenuUpdatePayload>, JsonRejection>,
) -> Result<ApiResponse<Menu>, ApiError> {
    let Path(id) = path?;
    let Json(payload) = body?;
    let menu = state.menus.update_menu(MenuId::new(id), payload).await?;
    Ok(ApiResponse::ok(menu))
}

/// DELETE /api/admin/menus/{id}
#[tracing::instrument(skip(state, path))]
pub async fn delete<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<()>, ApiError> {
    let Path(id) = path?;
    state.menus.delete_menu(MenuId::new(id)).await?;
    Ok(ApiResponse::message("menu deleted"))
}
