//! API integration tests
//!
//! Run against a live server with a migrated database:
//! `cargo test --test api_tests -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Unique suffix so repeated runs don't collide on unique columns
fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}{}", prefix, nanos)
}

/// Register a fresh user and return the response body
async fn register(client: &Client, username: &str, password: &str) -> Value {
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": password,
            "first_name": "Alice"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse register response")
}

async fn auth_token(client: &Client) -> String {
    let body = register(client, &unique("reader"), "secret123").await;
    body["token"].as_str().expect("No token in response").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_returns_identity_and_tokens() {
    let client = Client::new();
    let body = register(&client, &unique("alice"), "secret123").await;

    assert!(!body["user"]["user_id"].as_str().unwrap().is_empty());
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert!(!body["refresh_token"].as_str().unwrap().is_empty());
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
#[ignore]
async fn test_register_duplicate_username_conflicts() {
    let client = Client::new();
    let username = unique("dup");
    register(&client, &username, "secret123").await;

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("other-{}@example.com", username),
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "username or email already exists");
}

#[tokio::test]
#[ignore]
async fn test_login_and_wrong_password() {
    let client = Client::new();
    let username = unique("alice");
    register(&client, &username, "secret123").await;

    let response = client
        .post(format!("{}/users/login", BASE_URL))
        .json(&json!({ "username": username, "password": "secret123" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(body["token"].is_string());

    let response = client
        .post(format!("{}/users/login", BASE_URL))
        .json(&json!({ "username": username, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "login or password is incorrect" }));
}

#[tokio::test]
#[ignore]
async fn test_refresh_rotates_tokens() {
    let client = Client::new();
    let body = register(&client, &unique("refresh"), "secret123").await;
    let refresh_token = body["refresh_token"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/users/refresh", BASE_URL))
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The old refresh token was superseded by the new pair
    let response = client
        .post(format!("{}/users/refresh", BASE_URL))
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_protected_routes_require_token() {
    let client = Client::new();

    let response = client.get(format!("{}/books", BASE_URL)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(format!("{}/books", BASE_URL))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

async fn create_order(client: &Client, token: &str) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "type_of_book": "Novel",
            "name": unique("Dune "),
            "author_name": "Frank Herbert",
            "quantity": 2,
            "price": "12.50"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let book: Value = response.json().await.unwrap();

    let response = client
        .post(format!("{}/orders", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "person_id": 1,
            "book_id": book["id"],
            "borrow_date": "2024-03-01"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let order: Value = response.json().await.unwrap();
    assert_eq!(order["status"], "Borrowed");
    order["id"].as_i64().unwrap()
}

#[tokio::test]
#[ignore]
async fn test_update_order_status() {
    let client = Client::new();
    let token = auth_token(&client).await;
    let id = create_order(&client, &token).await;

    let response = client
        .put(format!("{}/orders/{}", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "status": "Returned" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let order: Value = client
        .get(format!("{}/orders/{}", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(order["status"], "Returned");
}

#[tokio::test]
#[ignore]
async fn test_update_order_rejections() {
    let client = Client::new();
    let token = auth_token(&client).await;
    let id = create_order(&client, &token).await;

    let response = client
        .put(format!("{}/orders/{}", BASE_URL, 999_999_999))
        .bearer_auth(&token)
        .json(&json!({ "status": "Returned" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .put(format!("{}/orders/{}", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "status": "Lost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .put(format!("{}/orders/{}", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "unknown": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "no valid fields provided for update");

    // Rejected updates leave the record untouched
    let order: Value = client
        .get(format!("{}/orders/{}", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(order["status"], "Borrowed");
}
