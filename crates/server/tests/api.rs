use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::router(Arc::new(engine))
}

async fn send(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Register an account and log it in, returning the bearer token.
async fn login_as(app: &Router, email: &str, role: &str) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/v1/user",
        None,
        Some(json!({ "email": email, "password": "secret", "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/v1/login",
        None,
        Some(json!({ "email": email, "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn create_product(app: &Router, token: &str, name: &str, cost: i64) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/v1/products",
        Some(token),
        Some(json!({ "product_name": name, "cost": cost })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["product_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn version_is_public() {
    let app = app().await;
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/v1/user", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthenticated");

    let (status, _) = send(&app, Method::GET, "/v1/products", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_reports_other_sessions_and_wrong_password() {
    let app = app().await;
    login_as(&app, "buyer@example.com", "buyer").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/login",
        None,
        Some(json!({ "email": "buyer@example.com", "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["other_sessions_active"], true);

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/login",
        None,
        Some(json!({ "email": "buyer@example.com", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthenticated");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app().await;
    login_as(&app, "buyer@example.com", "buyer").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/user",
        None,
        Some(json!({ "email": "buyer@example.com", "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");
}

#[tokio::test]
async fn user_profile_can_be_read_and_updated() {
    let app = app().await;
    let token = login_as(&app, "buyer@example.com", "buyer").await;

    let (status, body) = send(&app, Method::GET, "/v1/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "buyer@example.com");
    assert_eq!(body["role"], "buyer");
    assert_eq!(body["deposit"], 0);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/v1/user",
        Some(&token),
        Some(json!({ "full_name": "Bea Buyer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["full_name"], "Bea Buyer");

    let (status, body) = send(&app, Method::PUT, "/v1/user", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn deposit_buy_and_reset_flow() {
    let app = app().await;
    let seller = login_as(&app, "seller@example.com", "seller").await;
    let buyer = login_as(&app, "buyer@example.com", "buyer").await;
    let product_id = create_product(&app, &seller, "Cola", 50).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/deposit",
        Some(&buyer),
        Some(json!({ "amount": 60 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/deposit",
        Some(&buyer),
        Some(json!({ "amount": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deposit"], 100);

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/buy",
        Some(&buyer),
        Some(json!({ "product_id": product_id, "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "insufficient_funds");

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/buy",
        Some(&buyer),
        Some(json!({ "product_id": product_id, "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount_spent"], 50);
    assert_eq!(body["change"], 50);
    assert_eq!(body["quantity_purchased"], 1);

    let (status, body) = send(&app, Method::POST, "/v1/reset", Some(&buyer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deposit"], 0);

    let (_, body) = send(&app, Method::GET, "/v1/user", Some(&buyer), None).await;
    assert_eq!(body["deposit"], 0);
}

#[tokio::test]
async fn buying_a_missing_product_is_404() {
    let app = app().await;
    let buyer = login_as(&app, "buyer@example.com", "buyer").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/buy",
        Some(&buyer),
        Some(json!({ "product_id": uuid::Uuid::new_v4(), "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn role_and_ownership_failures_are_distinguishable() {
    let app = app().await;
    let owner = login_as(&app, "owner@example.com", "seller").await;
    let other = login_as(&app, "other@example.com", "seller").await;
    let buyer = login_as(&app, "buyer@example.com", "buyer").await;
    let product_id = create_product(&app, &owner, "Cola", 50).await;
    let path = format!("/v1/products/{product_id}");

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/deposit",
        Some(&owner),
        Some(json!({ "amount": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "authorization");

    let (status, body) = send(&app, Method::DELETE, &path, Some(&buyer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "authorization");

    let (status, body) = send(
        &app,
        Method::PUT,
        &path,
        Some(&other),
        Some(json!({ "cost": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "ownership");

    let (status, body) = send(&app, Method::GET, &path, Some(&buyer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cost"], 50);
}

#[tokio::test]
async fn seller_manages_catalogue() {
    let app = app().await;
    let seller = login_as(&app, "seller@example.com", "seller").await;

    let (status, body) = send(&app, Method::GET, "/v1/products", Some(&seller), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let product_id = create_product(&app, &seller, "Cola", 50).await;
    let path = format!("/v1/products/{product_id}");

    let (status, body) = send(
        &app,
        Method::PUT,
        &path,
        Some(&seller),
        Some(json!({ "product_name": "Cola Zero", "cost": 55 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product_name"], "Cola Zero");
    assert_eq!(body["cost"], 55);

    let (status, body) = send(&app, Method::GET, "/v1/products", Some(&seller), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &path, Some(&seller), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, &path, Some(&seller), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_revokes_only_the_presented_token() {
    let app = app().await;
    let first = login_as(&app, "buyer@example.com", "buyer").await;
    let (_, body) = send(
        &app,
        Method::POST,
        "/v1/login",
        None,
        Some(json!({ "email": "buyer@example.com", "password": "secret" })),
    )
    .await;
    let second = body["token"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::POST, "/v1/verify-token", Some(&first), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::POST, "/v1/logout", Some(&first), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::POST, "/v1/verify-token", Some(&first), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, Method::POST, "/v1/verify-token", Some(&second), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::POST, "/v1/logout/all", Some(&second), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revoked"], 1);
    let (status, _) = send(&app, Method::POST, "/v1/verify-token", Some(&second), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deleted_user_loses_access() {
    let app = app().await;
    let token = login_as(&app, "buyer@example.com", "buyer").await;

    let (status, _) = send(&app, Method::DELETE, "/v1/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/v1/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn roles_are_matched_in_any_case() {
    let app = app().await;
    let token = login_as(&app, "seller@example.com", "SELLER").await;

    let (status, body) = send(&app, Method::GET, "/v1/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "seller");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/v1/user",
        Some(&token),
        Some(json!({ "role": "BUYER" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "buyer");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/v1/user",
        Some(&token),
        Some(json!({ "role": "Seller" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "seller");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/v1/user",
        Some(&token),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "bad_request");
}

#[tokio::test]
async fn malformed_requests_get_a_json_error() {
    let app = app().await;
    let buyer = login_as(&app, "buyer@example.com", "buyer").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/deposit",
        Some(&buyer),
        Some(json!({ "amount": "ten" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "bad_request");
    assert!(body["error"].is_string());

    let (status, body) = send(
        &app,
        Method::GET,
        "/v1/products/not-a-uuid",
        Some(&buyer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "bad_request");

    let (_, body) = send(&app, Method::GET, "/v1/user", Some(&buyer), None).await;
    assert_eq!(body["deposit"], 0);
}
