//! HTTP API server for the coffee order service.
//!
//! Provides the public menu and ordering endpoints plus the admin surface
//! for menus, orders, inventory and the dashboard, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod response;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::http::HeaderValue;
use axum::routing::{get, patch, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::ApiError;
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
    config: &Config,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let api = Router::new()
        .route("/menus", get(routes::menus::list::<S>))
        .route("/menus/{id}", get(routes::menus::get::<S>))
        .route("/orders", post(routes::orders::create::<S>))
        .route("/admin/menus", post(routes::menus::create::<S>))
        .route(
            "/admin/menus/{id}",
            put(routes::menus::update::<S>).delete(routes::menus::delete::<S>),
        )
        .route("/admin/orders", get(routes::orders::list::<S>))
        .route("/admin/orders/{id}", get(routes::orders::get::<S>))
        .route(
            "/admin/orders/{id}/status",
            patch(routes::orders::change_status::<S>),
        )
        .route("/admin/inventory", get(routes::inventory::list::<S>))
        .route(
            "/admin/inventory/{menu_id}",
            put(routes::inventory::set::<S>),
        )
        .route(
            "/admin/inventory/{menu_id}/increase",
            patch(routes::inventory::increase::<S>),
        )
        .route(
            "/admin/inventory/{menu_id}/decrease",
            patch(routes::inventory::decrease::<S>),
        )
        .route(
            "/admin/dashboard/stats",
            get(routes::dashboard::stats::<S>),
        );

    Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::check))
        .nest("/api", api)
        .with_state(state)
        .merge(metrics_router)
        .fallback(routes::not_found)
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(middleware::map_response(response::envelope_bare_errors))
        .layer(cors_layer(&config.cors_origin))
        .layer(TraceLayer::new_for_http())
}

/// `*` allows any origin; anything else must be a single exact origin.
fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = if origin == "*" {
        AllowOrigin::from(Any)
    } else {
        match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!(%origin, "invalid CORS origin, allowing any origin");
                AllowOrigin::from(Any)
            }
        }
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Creates the application state on top of `store`.
pub fn create_state<S: Store + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store))
}
