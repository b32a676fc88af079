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
    let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder().database(db).build().await.unwrap();

    server::app(
        engine,
        &server::AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
        },
    )
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, name: &str, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_is_public() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/api/health-check", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_login_me_round_trip() {
    let app = test_app().await;

    let token = register(&app, "Alice", "alice@example.com", "hunter2").await;

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["name"], "Alice");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], "alice@example.com");
}

#[tokio::test]
async fn wrong_password_is_401_without_token() {
    let app = test_app().await;
    register(&app, "Alice", "alice@example.com", "hunter2").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["token"].is_null());
    assert_eq!(body["error"], "invalid email or password");
}

#[tokio::test]
async fn duplicate_registration_is_400() {
    let app = test_app().await;
    register(&app, "Alice", "alice@example.com", "hunter2").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Alice", "email": "alice@example.com", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email already registered");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = test_app().await;

    let (status, _) = send(&app, "GET", "/api/accounts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/accounts", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn transaction_without_account_creates_main_wallet() {
    let app = test_app().await;
    let token = register(&app, "Alice", "alice@example.com", "hunter2").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/transactions",
        Some(&token),
        Some(json!({
            "kind": "income",
            "amount_minor": 100,
            "occurred_at": "2026-03-01T10:00:00+00:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", "/api/accounts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let accounts = body["accounts"].as_array().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["name"], "Main Wallet");
    assert_eq!(accounts[0]["is_default"], true);
    assert_eq!(accounts[0]["balance_minor"], 100);
}

#[tokio::test]
async fn deleting_the_default_account_is_400() {
    let app = test_app().await;
    let token = register(&app, "Alice", "alice@example.com", "hunter2").await;

    let (status, body) = send(&app, "GET", "/api/accounts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["accounts"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/accounts/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "default account cannot be deleted");
}

#[tokio::test]
async fn deleting_a_side_account_moves_its_balance() {
    let app = test_app().await;
    let token = register(&app, "Alice", "alice@example.com", "hunter2").await;

    // Materialize the default first.
    let (_, body) = send(&app, "GET", "/api/accounts", Some(&token), None).await;
    let default_id = body["accounts"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/api/accounts",
        Some(&token),
        Some(json!({ "name": "Cash Jar", "kind": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let side_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/api/transactions",
        Some(&token),
        Some(json!({
            "kind": "income",
            "amount_minor": 500,
            "account_id": side_id,
            "occurred_at": "2026-03-01T10:00:00+00:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/accounts/{side_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, "GET", "/api/accounts", Some(&token), None).await;
    let accounts = body["accounts"].as_array().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["id"].as_str().unwrap(), default_id);
    assert_eq!(accounts[0]["balance_minor"], 500);
}

#[tokio::test]
async fn dashboard_stats_balance_identity() {
    let app = test_app().await;
    let token = register(&app, "Alice", "alice@example.com", "hunter2").await;

    // Recent enough to land in the monthly window regardless of when the
    // test runs.
    let now = chrono::Utc::now().to_rfc3339();
    for (kind, amount) in [("income", 1500), ("expense", 400)] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/transactions",
            Some(&token),
            Some(json!({ "kind": kind, "amount_minor": amount, "occurred_at": now })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", "/api/dashboard/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["monthly"]["income_minor"], 1500);
    assert_eq!(body["monthly"]["expenses_minor"], 400);
    assert_eq!(body["monthly"]["balance_minor"], 1100);

    let month_wise = body["month_wise"].as_array().unwrap();
    let total_income: i64 = month_wise
        .iter()
        .map(|m| m["income_minor"].as_i64().unwrap())
        .sum();
    assert_eq!(total_income, 1500);
}

#[tokio::test]
async fn listing_categories_creates_defaults() {
    let app = test_app().await;
    let token = register(&app, "Alice", "alice@example.com", "hunter2").await;

    let (status, body) = send(&app, "GET", "/api/categories", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 2);
    let names: Vec<&str> = categories
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Other Income"));
    assert!(names.contains(&"Other Expenses"));
}

#[tokio::test]
async fn in_use_item_cannot_be_deleted() {
    let app = test_app().await;
    let token = register(&app, "Alice", "alice@example.com", "hunter2").await;

    let (_, body) = send(&app, "GET", "/api/categories", Some(&token), None).await;
    let category_id = body["categories"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/api/items",
        Some(&token),
        Some(json!({ "category_id": category_id, "name": "Coffee" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let item_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/api/transactions",
        Some(&token),
        Some(json!({
            "kind": "expense",
            "amount_minor": 450,
            "category_id": category_id,
            "item_id": item_id,
            "occurred_at": "2026-03-01T10:00:00+00:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/items/{item_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "item is referenced by transactions");
}

#[tokio::test]
async fn password_reset_flow() {
    let app = test_app().await;
    register(&app, "Alice", "alice@example.com", "hunter2").await;

    // Always 200, regardless of whether the email exists.
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(json!({ "email": "nobody@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(json!({ "email": "alice@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A made-up token is a business-rule rejection.
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/reset-password",
        None,
        Some(json!({ "token": "made-up", "password": "new-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "reset token invalid or expired");
}
