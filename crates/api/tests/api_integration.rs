//! Integration tests for the API server.

use std::sync::OnceLock;

use api::Config;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use store::InMemoryStore;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, InMemoryStore) {
    setup_with(&Config::default())
}

fn setup_with(config: &Config) -> (axum::Router, InMemoryStore) {
    let store = InMemoryStore::new();
    let state = api::create_state(store.clone());
    let app = api::create_app(state, get_metrics_handle(), config);
    (app, store)
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Creates a menu and sets its stock, returning the menu id.
async fn seed_menu(app: &axum::Router, name: &str, price: i64, stock: i64) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/admin/menus",
        Some(json!({ "name": name, "price": price })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(
        app,
        "PUT",
        &format!("/api/admin/inventory/{id}"),
        Some(json!({ "currentStock": stock })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    id
}

fn order_body(menu_id: i64, name: &str, price: i64, quantity: i64) -> Value {
    json!({
        "items": [{
            "menuId": menu_id,
            "menuName": name,
            "basePrice": price,
            "quantity": quantity,
            "totalPrice": price * quantity,
            "selectedOptions": []
        }],
        "totalAmount": price * quantity
    })
}

async fn place_order(app: &axum::Router, body: Value) -> i64 {
    let (status, body) = send(app, "POST", "/api/orders", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

async fn set_status(app: &axum::Router, order_id: i64, status: &str) -> (StatusCode, Value) {
    send(
        app,
        "PATCH",
        &format!("/api/admin/orders/{order_id}/status"),
        Some(json!({ "status": status })),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_unknown_route_returns_envelope() {
    let (app, _) = setup();

    let (status, body) = send(&app, "GET", "/api/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_order_lifecycle_debits_stock_once() {
    let (app, store) = setup();
    let latte = seed_menu(&app, "Latte", 4500, 10).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(order_body(latte, "Latte", 4500, 2)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "received");
    assert_eq!(body["data"]["totalAmount"], 9000);
    assert!(body["data"]["orderNumber"].as_str().unwrap().ends_with("-001"));
    let order_id = body["data"]["id"].as_i64().unwrap();

    // Placing an order does not touch stock.
    assert_eq!(store.stock_of(common::MenuId::new(latte)).await, Some(10));

    let (status, body) = set_status(&app, order_id, "preparing").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "preparing");
    assert_eq!(store.stock_of(common::MenuId::new(latte)).await, Some(8));

    let (status, _) = set_status(&app, order_id, "completed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.stock_of(common::MenuId::new(latte)).await, Some(8));

    let (status, body) = send(&app, "GET", &format!("/api/admin/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["items"][0]["menuName"], "Latte");
}

#[tokio::test]
async fn test_order_exceeding_stock_is_rejected() {
    let (app, store) = setup();
    let mocha = seed_menu(&app, "Mocha", 5000, 1).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(order_body(mocha, "Mocha", 5000, 3)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_STOCK");
    assert_eq!(body["error"]["details"][0]["needed"], 3);
    assert_eq!(store.order_count().await, 0);
}

#[tokio::test]
async fn test_preparing_fails_when_stock_ran_out() {
    let (app, store) = setup();
    let latte = seed_menu(&app, "Latte", 4500, 2).await;

    let first = place_order(&app, order_body(latte, "Latte", 4500, 2)).await;
    let second = place_order(&app, order_body(latte, "Latte", 4500, 1)).await;

    let (status, _) = set_status(&app, first, "preparing").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = set_status(&app, second, "preparing").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_STOCK");

    let (_, body) = send(&app, "GET", &format!("/api/admin/orders/{second}"), None).await;
    assert_eq!(body["data"]["status"], "received");
    assert_eq!(store.stock_of(common::MenuId::new(latte)).await, Some(0));
}

#[tokio::test]
async fn test_illegal_transition_is_rejected() {
    let (app, _) = setup();
    let latte = seed_menu(&app, "Latte", 4500, 5).await;
    let order_id = place_order(&app, order_body(latte, "Latte", 4500, 1)).await;

    let (status, _) = set_status(&app, order_id, "cancelled").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = set_status(&app, order_id, "preparing").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_STATUS_TRANSITION");
    assert_eq!(body["error"]["details"]["from"], "cancelled");
    assert_eq!(body["error"]["details"]["to"], "preparing");
}

#[tokio::test]
async fn test_invalid_status_and_unknown_order() {
    let (app, _) = setup();

    let (status, body) = set_status(&app, 1, "shipped").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = set_status(&app, 999, "preparing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_requests_are_validation_errors() {
    let (app, _) = setup();

    let request = Request::builder()
        .method("POST")
        .uri("/api/orders")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(&app, "POST", "/api/orders", Some(json!({ "items": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(&app, "GET", "/api/menus/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_menu_crud_and_in_use_protection() {
    let (app, _) = setup();

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/menus",
        Some(json!({
            "name": "Americano",
            "price": 4000,
            "options": [{ "name": "Extra shot", "additionalPrice": 500 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["options"][0]["name"], "Extra shot");

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/menus",
        Some(json!({ "name": "Americano", "price": 4200 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "DUPLICATE_MENU");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/admin/menus/{id}"),
        Some(json!({ "price": 4300 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], 4300);

    let (status, body) = send(&app, "GET", "/api/menus", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    send(
        &app,
        "PUT",
        &format!("/api/admin/inventory/{id}"),
        Some(json!({ "currentStock": 3 })),
    )
    .await;
    place_order(&app, order_body(id, "Americano", 4300, 1)).await;

    let (status, body) = send(&app, "DELETE", &format!("/api/admin/menus/{id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "MENU_IN_USE");

    let unused = seed_menu(&app, "Tea", 3000, 0).await;
    let (status, body) = send(&app, "DELETE", &format!("/api/admin/menus/{unused}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["message"].is_string());

    let (status, _) = send(&app, "GET", &format!("/api/menus/{unused}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inventory_endpoints() {
    let (app, _) = setup();
    let latte = seed_menu(&app, "Latte", 4500, 5).await;

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/admin/inventory/{latte}/increase"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["currentStock"], 6);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/admin/inventory/{latte}/decrease"),
        Some(json!({ "amount": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["currentStock"], 2);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/admin/inventory/{latte}/decrease"),
        Some(json!({ "amount": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_STOCK");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/admin/inventory/{latte}/increase"),
        Some(json!({ "amount": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/admin/inventory/{latte}"),
        Some(json!({ "currentStock": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(&app, "PATCH", "/api/admin/inventory/999/increase", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = send(&app, "GET", "/api/admin/inventory", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["menuName"], "Latte");
    assert_eq!(body["data"][0]["currentStock"], 2);
}

#[tokio::test]
async fn test_order_list_filters_and_dashboard() {
    let (app, _) = setup();
    let latte = seed_menu(&app, "Latte", 4500, 10).await;

    let first = place_order(&app, order_body(latte, "Latte", 4500, 1)).await;
    place_order(&app, order_body(latte, "Latte", 4500, 1)).await;
    set_status(&app, first, "preparing").await;

    let (status, body) = send(&app, "GET", "/api/admin/orders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, "GET", "/api/admin/orders?status=preparing", None).await;
    let orders = body["data"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], first);

    let (_, body) = send(&app, "GET", "/api/admin/orders?endDate=2000-01-01", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, "GET", "/api/admin/orders?startDate=soon", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(&app, "GET", "/api/admin/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalOrders"], 2);
    assert_eq!(body["data"]["receivedOrders"], 1);
    assert_eq!(body["data"]["preparingOrders"], 1);
    assert_eq!(body["data"]["completedOrders"], 0);
}

#[tokio::test]
async fn test_overflowing_order_total_is_rejected() {
    let (app, store) = setup();
    let latte = seed_menu(&app, "Latte", 4500, 10).await;
    let line = |total_price: i64| {
        json!({
            "menuId": latte,
            "menuName": "Latte",
            "basePrice": 4500,
            "quantity": 1,
            "totalPrice": total_price
        })
    };

    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(json!({
            "items": [line(i64::MAX), line(i64::MAX), line(2)],
            "totalAmount": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(store.order_count().await, 0);
}

#[tokio::test]
async fn test_oversized_body_returns_envelope() {
    let config = Config {
        body_limit_bytes: 16,
        ..Config::default()
    };
    let (app, _) = setup_with(&config);
    let payload = json!({ "amount": 1, "padding": "x".repeat(64) }).to_string();

    let request = Request::builder()
        .method("PATCH")
        .uri("/api/admin/inventory/1/increase")
        .header("content-type", "application/json")
        .header("content-length", payload.len())
        .body(Body::from(payload))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();
    let latte = seed_menu(&app, "Latte", 4500, 10).await;
    place_order(&app, order_body(latte, "Latte", 4500, 1)).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("orders_created_total"));
}
