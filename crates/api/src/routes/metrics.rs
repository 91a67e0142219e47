//! Prometheus metrics endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics::Unit;
use metrics_exporter_prometheus::PrometheusHandle;

/// GET /metrics: returns Prometheus-formatted metrics.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}

/// Registers descriptions for the metrics the services emit.
pub fn describe() {
    metrics::describe_counter!("orders_created_total", "Orders created");
    metrics::describe_counter!(
        "order_status_transitions_total",
        "Order status changes by from and to status"
    );
    metrics::describe_counter!(
        "inventory_debited_units_total",
        Unit::Count,
        "Stock units debited when orders start preparation"
    );
    metrics::describe_counter!(
        "stock_shortfalls_total",
        "Menus found short of stock for an order"
    );
    metrics::describe_histogram!(
        "order_create_duration_seconds",
        Unit::Seconds,
        "Time to validate and persist an order"
    );
}
