//! Scenario: storefront session handling against a mocked API.
//!
//! - A fresh login persists the token.
//! - A persisted token is reused without any login request.
//! - 401 and the wrong-password marker both map to `BadCredentials`.
//! - Server errors map to `AuthFailure::Transport`.

use std::time::Duration;

use cartfill_resolve::{Credentials, SessionPort};
use cartfill_schemas::AuthFailure;
use cartfill_storefront_http::{HttpStorefront, SessionStore, WRONG_PASSWORD_MARKER};
use httpmock::prelude::*;
use serde_json::json;

fn storefront(server: &MockServer, session_file: &std::path::Path) -> HttpStorefront {
    HttpStorefront::new(
        &server.base_url(),
        Duration::from_secs(5),
        SessionStore::new(session_file),
        vec![],
    )
    .unwrap()
}

fn creds() -> Credentials {
    Credentials::new("ops@example.com", "pw")
}

#[tokio::test]
async fn fresh_login_persists_token() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/login")
                .json_body(json!({ "email": "ops@example.com", "password": "pw" }));
            then.status(200).json_body(json!({ "token": "tok-fresh" }));
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");
    let sf = storefront(&server, &file);

    let session = sf.authenticate(&creds()).await.unwrap();
    login.assert_async().await;
    assert_eq!(session.token(), "tok-fresh");
    assert!(!session.reused);

    let stored = SessionStore::new(&file).load().unwrap().unwrap();
    assert_eq!(stored.token, "tok-fresh");
}

#[tokio::test]
async fn persisted_token_skips_login() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/login");
            then.status(200).json_body(json!({ "token": "tok-new" }));
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");
    SessionStore::new(&file).save("tok-saved").unwrap();

    let session = storefront(&server, &file).authenticate(&creds()).await.unwrap();

    assert_eq!(session.token(), "tok-saved");
    assert!(session.reused);
    assert_eq!(login.hits_async().await, 0);
}

#[tokio::test]
async fn unauthorized_is_bad_credentials() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/login");
            then.status(401);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let err = storefront(&server, &dir.path().join("s.json"))
        .authenticate(&creds())
        .await
        .unwrap_err();
    assert_eq!(err, AuthFailure::BadCredentials);
}

#[tokio::test]
async fn wrong_password_page_is_bad_credentials() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/login");
            then.status(200)
                .header("content-type", "text/html")
                .body(format!("<html><p class=\"error\">{WRONG_PASSWORD_MARKER}</p></html>"));
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("s.json");
    let err = storefront(&server, &file).authenticate(&creds()).await.unwrap_err();
    assert_eq!(err, AuthFailure::BadCredentials);
    assert!(!file.exists(), "no session may be persisted on failure");
}

#[tokio::test]
async fn server_error_is_transport_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/login");
            then.status(503);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let err = storefront(&server, &dir.path().join("s.json"))
        .authenticate(&creds())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthFailure::Transport(ref m) if m.contains("503")), "{err:?}");
}
