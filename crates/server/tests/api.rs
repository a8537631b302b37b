//! HTTP API tests running the router against an in-memory database.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn test_app() -> Router {
    let db = sea_orm::Database::connect("sqlite::memory:")
        .await
        .expect("connect in-memory database");
    migration::Migrator::up(&db, None)
        .await
        .expect("run migrations");
    let ledger = ledger::Ledger::builder()
        .database(db)
        .build()
        .await
        .expect("build ledger");

    server::router(server::ServerState {
        ledger: Arc::new(ledger),
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("build request"),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("build request"),
    };

    let response = app.clone().oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse body")
    };
    (status, value)
}

#[tokio::test]
async fn customer_roundtrip_and_duplicate_mobile() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/customers",
        Some(json!({"name": "Asha", "mobile": "0700111222"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_str().expect("customer id").to_string();

    let (status, body) = send(&app, "GET", &format!("/customers/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Asha");
    assert_eq!(body["balance"], 0);
    assert_eq!(body["debt_level"], "no_debt");

    let (status, _) = send(
        &app,
        "POST",
        "/customers",
        Some(json!({"name": "Other", "mobile": "0700111222"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_customer_is_404() {
    let app = test_app().await;
    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(&app, "GET", &format!("/customers/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn under_paid_receipt_opens_credit_and_flags_debt() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/products",
        Some(json!({"name": "Rice 1kg", "unit_price": 2000, "quantity_in_stock": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let product_id = body["id"].as_str().expect("product id").to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/receipts",
        Some(json!({
            "customer": {"new": {"name": "Asha", "mobile": "0700111222"}},
            "items": [{"product_id": product_id, "quantity": 3, "unit_price": 2000}],
            "amount_paid": 4000,
            "total_amount": 10000,
            "payments": [{"amount": 4000, "method": "cash"}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let receipt_id = body["id"].as_str().expect("receipt id").to_string();

    let (status, body) = send(&app, "GET", &format!("/receipts/{receipt_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["credit_amount"], 6000);
    assert_eq!(body["credit"]["amount_left"], 6000);
    assert_eq!(body["items"][0]["subtotal"], 6000);
    let customer_id = body["customer_id"].as_str().expect("customer id").to_string();

    // Stock went down.
    let (status, body) = send(&app, "GET", &format!("/products/{product_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity_in_stock"], 7);

    let (status, body) = send(&app, "GET", &format!("/customers/{customer_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["remaining_credit_amount"], 6000);
    assert_eq!(body["balance"], -6000);
    assert_eq!(body["debt_level"], "in_debt");
}

#[tokio::test]
async fn credit_payment_allocates_and_reports_surplus() {
    let app = test_app().await;

    let (_, body) = send(
        &app,
        "POST",
        "/receipts",
        Some(json!({
            "customer": {"new": {"name": "Juma", "mobile": "0700999888"}},
            "items": [],
            "amount_paid": 0,
            "total_amount": 5000,
            "payments": []
        })),
    )
    .await;
    let receipt_id = body["id"].as_str().expect("receipt id").to_string();

    let (_, body) = send(&app, "GET", &format!("/receipts/{receipt_id}"), None).await;
    let customer_id = body["customer_id"].as_str().expect("customer id").to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/creditPayments",
        Some(json!({
            "customer_id": customer_id,
            "amount": 8000,
            "method": "mobile_money"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allocations"][0]["amount_applied"], 5000);
    assert_eq!(body["allocations"][0]["fulfilled"], true);
    assert_eq!(body["unallocated"], 3000);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/customers/{customer_id}/credits"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["credits"][0]["fulfilled"], true);
    assert_eq!(body["credits"][0]["amount_left"], 0);
}

#[tokio::test]
async fn cancelling_twice_is_rejected() {
    let app = test_app().await;

    let (_, body) = send(
        &app,
        "POST",
        "/products",
        Some(json!({"name": "Soap", "unit_price": 500, "quantity_in_stock": 10})),
    )
    .await;
    let product_id = body["id"].as_str().expect("product id").to_string();

    let (_, body) = send(
        &app,
        "POST",
        "/receipts",
        Some(json!({
            "items": [{"product_id": product_id, "quantity": 3, "unit_price": 500}],
            "amount_paid": 1500,
            "total_amount": 1500,
            "payments": [{"amount": 1500, "method": "cash"}]
        })),
    )
    .await;
    let receipt_id = body["id"].as_str().expect("receipt id").to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/receipts/{receipt_id}/cancel"),
        Some(json!({"reason": "wrong items"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Stock came back.
    let (_, body) = send(&app, "GET", &format!("/products/{product_id}"), None).await;
    assert_eq!(body["quantity_in_stock"], 10);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/receipts/{receipt_id}/cancel"),
        Some(json!({"reason": "again"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn overselling_is_rejected() {
    let app = test_app().await;

    let (_, body) = send(
        &app,
        "POST",
        "/products",
        Some(json!({"name": "Milk", "unit_price": 1000, "quantity_in_stock": 2})),
    )
    .await;
    let product_id = body["id"].as_str().expect("product id").to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/receipts",
        Some(json!({
            "items": [{"product_id": product_id, "quantity": 5, "unit_price": 1000}],
            "amount_paid": 5000,
            "total_amount": 5000,
            "payments": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing was deducted.
    let (_, body) = send(&app, "GET", &format!("/products/{product_id}"), None).await;
    assert_eq!(body["quantity_in_stock"], 2);
}

#[tokio::test]
async fn reassigning_a_receipt_moves_the_debt() {
    let app = test_app().await;

    let (_, body) = send(
        &app,
        "POST",
        "/customers",
        Some(json!({"name": "Neema", "mobile": "0711000111"})),
    )
    .await;
    let target_id = body["id"].as_str().expect("customer id").to_string();

    let (_, body) = send(
        &app,
        "POST",
        "/receipts",
        Some(json!({
            "customer": {"new": {"name": "Asha", "mobile": "0700111222"}},
            "items": [],
            "amount_paid": 0,
            "total_amount": 3000,
            "payments": []
        })),
    )
    .await;
    let receipt_id = body["id"].as_str().expect("receipt id").to_string();

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/receipts/{receipt_id}/customer"),
        Some(json!({"customer_id": target_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", &format!("/customers/{target_id}"), None).await;
    assert_eq!(body["remaining_credit_amount"], 3000);
    assert_eq!(body["debt_level"], "in_debt");
}
