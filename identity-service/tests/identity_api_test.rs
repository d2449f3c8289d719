mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use tower::util::ServiceExt;

#[tokio::test]
async fn register_creates_a_pending_account() {
    let app = spawn_app();

    let body = register(&app.router, "alice", "secret123", "staff").await;
    assert!(body["account_id"].as_str().is_some());
    assert!(body["message"].as_str().unwrap().contains("approval"));

    // Pending accounts cannot obtain a token, even with the right secret
    let (status, body) = login(&app.router, "alice", "secret123").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().unwrap().contains("approval"));
}

#[tokio::test]
async fn duplicate_handle_conflicts() {
    let app = spawn_app();

    register(&app.router, "alice", "secret123", "staff").await;

    let (status, _) = post_json(
        &app.router,
        "/identity/register",
        json!({ "login_handle": "Alice", "secret": "another-secret", "role": "admin" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn approved_account_logs_in_with_its_role() {
    let app = spawn_app();

    let body = register(&app.router, "alice", "secret123", "staff").await;
    approve(&app.router, body["account_id"].as_str().unwrap()).await;

    let (status, body) = login(&app.router, "alice", "secret123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "staff");
    assert_eq!(body["login_handle"], "alice");
    assert!(body["token"].as_str().unwrap().len() > 20);
}

#[tokio::test]
async fn unknown_handle_and_wrong_secret_get_the_same_response() {
    let app = spawn_app();

    let body = register(&app.router, "alice", "secret123", "staff").await;
    approve(&app.router, body["account_id"].as_str().unwrap()).await;

    let (status_a, body_a) = login(&app.router, "nobody", "secret123").await;
    let (status_b, body_b) = login(&app.router, "alice", "wrong-secret").await;

    assert_eq!(status_a, StatusCode::UNAUTHORIZED);
    assert_eq!(status_b, StatusCode::UNAUTHORIZED);
    assert_eq!(body_a, body_b);
}

#[tokio::test]
async fn verify_round_trips_issued_tokens() {
    let app = spawn_app();

    let body = register(&app.router, "alice", "secret123", "staff").await;
    let account_id = body["account_id"].as_str().unwrap().to_string();
    approve(&app.router, &account_id).await;

    let (_, login_body) = login(&app.router, "alice", "secret123").await;
    let token = login_body["token"].as_str().unwrap();

    let (status, body) = post_json(&app.router, "/identity/verify", json!({ "token": token })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["claims"]["sub"], account_id.as_str());
    assert_eq!(body["claims"]["role"], "staff");
    assert_eq!(body["claims"]["handle"], "alice");
}

#[tokio::test]
async fn verify_rejects_garbage_tokens() {
    let app = spawn_app();

    let (status, body) =
        post_json(&app.router, "/identity/verify", json!({ "token": "garbage" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Invalid or expired token"));
}

#[tokio::test]
async fn registration_is_rate_limited() {
    let app = spawn_app_with_register_limit(2);

    register(&app.router, "alice", "secret123", "staff").await;
    register(&app.router, "bob", "secret123", "staff").await;

    let (status, _) = post_json(
        &app.router,
        "/identity/register",
        json!({ "login_handle": "carol", "secret": "secret123", "role": "staff" }),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn admin_routes_require_the_api_key() {
    let app = spawn_app();

    let body = register(&app.router, "alice", "secret123", "staff").await;
    let account_id = body["account_id"].as_str().unwrap();

    let (status, _) = post_json(
        &app.router,
        &format!("/identity/accounts/{}/approve", account_id),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post_json_with_headers(
        &app.router,
        &format!("/identity/accounts/{}/approve", account_id),
        json!({}),
        &[("X-Admin-Api-Key", "not-the-admin-key")],
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The account stayed pending
    let (status, _) = login(&app.router, "alice", "secret123").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn membership_grant_scopes_future_tokens() {
    let app = spawn_app();

    let body = register(&app.router, "alice", "secret123", "staff").await;
    let account_id = body["account_id"].as_str().unwrap().to_string();
    approve(&app.router, &account_id).await;

    let client_id = uuid::Uuid::new_v4();
    let (status, _) = post_json_with_headers(
        &app.router,
        &format!("/identity/accounts/{}/clients/{}", account_id, client_id),
        json!({}),
        &[("X-Admin-Api-Key", TEST_ADMIN_API_KEY)],
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, login_body) = login(&app.router, "alice", "secret123").await;
    let token = login_body["token"].as_str().unwrap();

    let (_, verify_body) =
        post_json(&app.router, "/identity/verify", json!({ "token": token })).await;
    assert_eq!(
        verify_body["claims"]["client_id"],
        client_id.to_string().as_str()
    );
}

#[tokio::test]
async fn deleted_account_can_no_longer_log_in() {
    let app = spawn_app();

    let body = register(&app.router, "alice", "secret123", "staff").await;
    let account_id = body["account_id"].as_str().unwrap().to_string();
    approve(&app.router, &account_id).await;

    let response = app
        .router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method("DELETE")
                .uri(format!("/identity/accounts/{}", account_id))
                .header("X-Admin-Api-Key", TEST_ADMIN_API_KEY)
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = login(&app.router, "alice", "secret123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
