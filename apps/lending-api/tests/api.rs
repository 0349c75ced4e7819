//! End-to-end tests driving the router in-process.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use lending_api::config::{ApiConfig, StoreBackend};
use lending_api::{create_router, AppState};
use lending_store::MemoryStore;

fn memory_app() -> Router {
    create_router(AppState::new(Arc::new(MemoryStore::new())))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

#[tokio::test]
async fn health_reports_status_and_store() {
    let app = memory_app();

    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
    // YYYY-MM-DD
    assert_eq!(body["date"].as_str().unwrap().len(), 10);
}

#[tokio::test]
async fn add_merges_by_name_and_category() {
    let app = memory_app();

    let (status, drill) = post(
        &app,
        "/api/items",
        json!({"name": "Drill", "category": "Tools", "quantity": 5}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(drill, json!({"id": 1, "name": "Drill", "category": "Tools", "quantity": 5}));

    let (status, merged) = post(
        &app,
        "/api/items",
        json!({"name": "drill", "category": " tools ", "quantity": 3}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(merged["id"], 1);
    assert_eq!(merged["quantity"], 8);

    let (_, items) = get(&app, "/api/items").await;
    assert_eq!(items.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn checkout_and_return_lifecycle() {
    let app = memory_app();
    post(
        &app,
        "/api/items",
        json!({"name": "Ladder", "category": "Garden", "quantity": 1}),
    )
    .await;

    let (status, checkout) = post(
        &app,
        "/api/checkout",
        json!({"item_id": 1, "borrower": "Alice", "checkout_date": "2024-01-01", "due_date": "2024-01-15"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        checkout,
        json!({
            "id": 1,
            "item_id": 1,
            "borrower": "Alice",
            "checkout_date": "2024-01-01",
            "due_date": "2024-01-15",
            "returned": false,
            "return_date": null
        })
    );

    // Last unit is out.
    let (status, err) = post(
        &app,
        "/api/checkout",
        json!({"item_id": 1, "borrower": "Bob", "checkout_date": "2024-01-02"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "OUT_OF_STOCK");

    let (_, open) = get(&app, "/api/checkedout").await;
    assert_eq!(open.as_array().unwrap().len(), 1);

    let (status, returned) = post(
        &app,
        "/api/return",
        json!({"checkout_id": 1, "return_date": "2024-01-05"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["returned"], true);
    assert_eq!(returned["return_date"], "2024-01-05");

    let (_, items) = get(&app, "/api/items").await;
    assert_eq!(items[0]["quantity"], 1);
    let (_, open) = get(&app, "/api/checkedout").await;
    assert_eq!(open, json!([]));

    let (status, err) = post(
        &app,
        "/api/return",
        json!({"checkout_id": 1, "return_date": "2024-02-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "ALREADY_RETURNED");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = memory_app();

    let (status, err) = post(
        &app,
        "/api/checkout",
        json!({"item_id": 42, "borrower": "Alice", "checkout_date": "2024-01-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "NOT_FOUND");

    let (status, err) = post(
        &app,
        "/api/return",
        json!({"checkout_id": 999, "return_date": "2024-01-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["message"], "Checkout record not found: 999");
}

#[tokio::test]
async fn invalid_bodies_are_validation_errors() {
    let app = memory_app();

    let cases = [
        json!({"name": "Saw", "category": "Tools", "quantity": -1}),
        json!({"name": "   ", "category": "Tools", "quantity": 1}),
        json!({"name": "Saw", "quantity": 1}),
    ];
    for body in cases {
        let (status, err) = post(&app, "/api/items", body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err["code"], "VALIDATION_ERROR");
    }

    let (status, err) = post(
        &app,
        "/api/checkout",
        json!({"item_id": 1, "borrower": "Bob", "checkout_date": "01/02/2024"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["code"], "VALIDATION_ERROR");

    // Nothing was stored along the way.
    let (_, items) = get(&app, "/api/items").await;
    assert_eq!(items, json!([]));
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = memory_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/items")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn cors_is_permissive() {
    let app = memory_app();

    let request = Request::builder()
        .uri("/api/items")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn json_backend_from_config_persists_to_files() {
    let tmp = tempfile::TempDir::new().unwrap();
    let mut config = ApiConfig::default();
    config.storage.backend = StoreBackend::Json;
    config.storage.data_dir = tmp.path().join("data");

    let app = create_router(AppState::from_config(&config).await.unwrap());
    post(
        &app,
        "/api/items",
        json!({"name": "Tent", "category": "Camping", "quantity": 2}),
    )
    .await;

    let raw = std::fs::read_to_string(config.storage.data_dir.join("items.json")).unwrap();
    let on_disk: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(on_disk[0]["name"], "Tent");

    let (_, health) = get(&app, "/api/health").await;
    assert_eq!(health["store"], "json");
}

#[tokio::test]
async fn sqlite_backend_from_config_survives_restart() {
    let tmp = tempfile::TempDir::new().unwrap();
    let mut config = ApiConfig::default();
    config.storage.backend = StoreBackend::Sqlite;
    config.storage.data_dir = tmp.path().to_path_buf();

    {
        let app = create_router(AppState::from_config(&config).await.unwrap());
        post(
            &app,
            "/api/items",
            json!({"name": "Projector", "category": "Electronics", "quantity": 1}),
        )
        .await;
        let (status, _) = post(
            &app,
            "/api/checkout",
            json!({"item_id": 1, "borrower": "Carol", "checkout_date": "2024-03-01"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let app = create_router(AppState::from_config(&config).await.unwrap());
    let (_, items) = get(&app, "/api/items").await;
    assert_eq!(items[0]["quantity"], 0);
    let (_, open) = get(&app, "/api/checkedout").await;
    assert_eq!(open[0]["borrower"], "Carol");
}
