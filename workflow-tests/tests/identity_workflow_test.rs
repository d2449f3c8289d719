//! Account lifecycle over the wire: registration, the approval gate, login,
//! and token verification at the authority.

mod common;

use common::unique_handle;
use workflow_tests::{spawn_identity, WorkflowClient};

#[tokio::test]
async fn registration_leaves_the_account_pending() {
    let identity = spawn_identity().await.unwrap();
    let client = WorkflowClient::new(&identity);
    let handle = unique_handle("pending");

    let (status, body) = client
        .register(&handle, "workflow-secret-1", "staff")
        .await
        .unwrap();
    assert_eq!(status, 201);
    assert!(body["token"].is_null());

    // Correct credentials, but no approval yet
    let (status, body) = client.login(&handle, "workflow-secret-1").await.unwrap();
    assert_eq!(status, 403);
    assert!(body["message"].as_str().unwrap().contains("approval"));
}

#[tokio::test]
async fn approval_unlocks_login_and_the_token_verifies() {
    let identity = spawn_identity().await.unwrap();
    let client = WorkflowClient::new(&identity);
    let handle = unique_handle("approved");

    let (_, body) = client
        .register(&handle, "workflow-secret-1", "staff")
        .await
        .unwrap();
    let account_id = body["account_id"].as_str().unwrap().to_string();

    let (status, _) = client.approve(&account_id).await.unwrap();
    assert_eq!(status, 200);

    let (status, body) = client.login(&handle, "workflow-secret-1").await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["role"], "staff");
    let token = body["token"].as_str().unwrap();

    let (status, body) = client.verify(token).await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["claims"]["sub"], account_id.as_str());
    assert_eq!(body["claims"]["role"], "staff");
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let identity = spawn_identity().await.unwrap();
    let client = WorkflowClient::new(&identity);
    let handle = unique_handle("creds");

    let (_, body) = client
        .register(&handle, "workflow-secret-1", "staff")
        .await
        .unwrap();
    client
        .approve(body["account_id"].as_str().unwrap())
        .await
        .unwrap();

    let (status_a, body_a) = client.login("no-such-handle", "workflow-secret-1").await.unwrap();
    let (status_b, body_b) = client.login(&handle, "wrong-secret-99").await.unwrap();

    assert_eq!(status_a, 401);
    assert_eq!(status_b, 401);
    assert_eq!(body_a, body_b);
}

#[tokio::test]
async fn garbage_token_is_rejected_by_the_authority() {
    let identity = spawn_identity().await.unwrap();
    let client = WorkflowClient::new(&identity);

    let (status, _) = client.verify("not-a-token").await.unwrap();
    assert_eq!(status, 401);
}
