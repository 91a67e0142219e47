//! Order endpoints: placement, admin listing and status changes.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use common::OrderId;
use domain::{Order, OrderPayload, OrderStatus, StatusChange, StatusPayload};
use serde::Deserialize;
use store::{OrderQuery, Store};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Query string of `GET /api/admin/orders`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

impl OrderFilter {
    /// Converts the filter to a store query, reading bare dates in `tz`.
    ///
    /// A bare `endDate` covers the whole day. Empty values are ignored.
    pub fn into_query<Tz: TimeZone>(self, tz: &Tz) -> Result<OrderQuery, ApiError> {
        let mut query = OrderQuery::new();
        if let Some(status) = non_empty(self.status) {
            let status: OrderStatus = status
                .parse()
                .map_err(|_| ApiError::Validation(vec!["invalid order status".to_string()]))?;
            query = query.status(status);
        }
        if let Some(start) = non_empty(self.start_date) {
            query = query.created_from(parse_bound(&start, tz, Bound::Start)?);
        }
        if let Some(end) = non_empty(self.end_date) {
            query = query.created_to(parse_bound(&end, tz, Bound::End)?);
        }
        Ok(query)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_bound<Tz: TimeZone>(
    value: &str,
    tz: &Tz,
    bound: Bound,
) -> Result<DateTime<Utc>, ApiError> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::Validation(vec![format!("invalid date: {value}")]))?;
    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN),
    };
    let local = NaiveDateTime::new(date, time);
    let resolved = match bound {
        Bound::Start => tz.from_local_datetime(&local).earliest(),
        Bound::End => tz.from_local_datetime(&local).latest(),
    };
    Ok(resolved
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| local.and_utc()))
}

/// POST /api/orders
#[tracing::instrument(skip(state, body))]
pub async fn create<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<OrderPayload>, JsonRejection>,
) -> Result<ApiResponse<Order>, ApiError> {
    let Json(payload) = body?;
    let order = state.orders.create_order(payload).await?;
    Ok(ApiResponse::created(order))
}

/// GET /api/admin/orders
pub async fn list<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    filter: Result<Query<OrderFilter>, QueryRejection>,
) -> Result<ApiResponse<Vec<Order>>, ApiError> {
    let Query(filter) = filter?;
    let query = filter.into_query(&Local)?;
    Ok(ApiResponse::ok(state.orders.list_orders(query).await?))
}

/// GET /api/admin/orders/{id}
pub async fn get<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<Order>, ApiError> {
    let Path(id) = path?;
    Ok(ApiResponse::ok(state.orders.get_order(OrderId::new(id)).await?))
}

/// PATCH /api/admin/orders/{id}/status
#[tracing::instrument(skip(state, path, body))]
pub async fn change_status<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<StatusPayload>, JsonRejection>,
) -> Result<ApiResponse<StatusChange>, ApiError> {
    let Path(id) = path?;
    let Json(payload) = body?;
    let status = payload.into_status()?;
    let change = state.orders.change_status(OrderId::new(id), status).await?;
    Ok(ApiResponse::ok(change))
}
