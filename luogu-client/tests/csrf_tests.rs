mod common;

use common::*;
use luogu_client::{LuoguError, resolve_csrf_token};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Token resolution ────────────────────────────────────────────

#[tokio::test]
async fn resolves_token_from_page() {
    let server = MockServer::start().await;
    mount_csrf_page(&server, "/", CSRF_TOKEN, 1).await;

    let client = mock_client(&server);
    let token = resolve_csrf_token(&client, "/").await.unwrap();
    assert_eq!(token, CSRF_TOKEN);
}

#[tokio::test]
async fn page_without_token_is_token_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><head></head></html>"))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = resolve_csrf_token(&client, "/").await.unwrap_err();
    match err {
        LuoguError::TokenNotFound { page } => assert_eq!(page, format!("{}/", server.uri())),
        other => panic!("expected TokenNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn script_text_does_not_shadow_real_token() {
    let server = MockServer::start().await;
    let page = format!(
        "<html><head><script>document.write('<meta name=\"csrf-token\" content=\"fake\">');</script>{}</head></html>",
        csrf_page(CSRF_TOKEN)
    );
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/paste/delete/abc123"))
        .and(header("x-csrf-token", CSRF_TOKEN))
        .respond_with(json_response(json!({"id": "abc123"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    client.mutate("/paste/delete/abc123", None).await.unwrap();
}

#[tokio::test]
async fn empty_token_aborts_before_post() {
    let server = MockServer::start().await;
    mount_csrf_page(&server, "/", "", 1).await;
    Mock::given(method("POST"))
        .respond_with(json_response(json!({"id": "never"})))
        .expect(0)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client.mutate("/paste/new", None).await.unwrap_err();
    assert!(matches!(err, LuoguError::TokenNotFound { .. }));
}

#[tokio::test]
async fn page_fetch_is_not_content_only() {
    let server = MockServer::start().await;
    mount_csrf_page(&server, "/", CSRF_TOKEN, 1).await;

    let client = mock_client(&server);
    resolve_csrf_token(&client, "/").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("x-luogu-type").is_none());
}

// ── Guarded mutations ───────────────────────────────────────────

#[tokio::test]
async fn mutate_forwards_token_and_body() {
    let server = MockServer::start().await;
    mount_csrf_page(&server, "/", CSRF_TOKEN, 1).await;
    Mock::given(method("POST"))
        .and(path("/paste/new"))
        .and(header("x-csrf-token", CSRF_TOKEN))
        .and(body_json(json!({"data": "hello", "public": true})))
        .respond_with(json_response(json!({"id": "abc123"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let body = json!({"data": "hello", "public": true});
    let response = client.mutate("/paste/new", Some(&body)).await.unwrap();
    assert_eq!(response["id"], "abc123");
}

#[tokio::test]
async fn every_mutation_fetches_a_fresh_token() {
    let server = MockServer::start().await;
    mount_csrf_page(&server, "/", CSRF_TOKEN, 2).await;
    Mock::given(method("POST"))
        .and(path("/paste/delete/abc123"))
        .respond_with(json_response(json!({"id": "abc123"})))
        .expect(2)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    client.mutate("/paste/delete/abc123", None).await.unwrap();
    client.mutate("/paste/delete/abc123", None).await.unwrap();
}

#[tokio::test]
async fn missing_token_aborts_before_post() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(json_response(json!({"id": "never"})))
        .expect(0)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client.mutate("/paste/new", None).await.unwrap_err();
    assert!(matches!(err, LuoguError::TokenNotFound { .. }));
}

#[tokio::test]
async fn mutation_response_code_is_not_inspected() {
    let server = MockServer::start().await;
    mount_csrf_page(&server, "/", CSRF_TOKEN, 1).await;
    Mock::given(method("POST"))
        .and(path("/paste/new"))
        .respond_with(json_response(json!({"code": 403, "errorMessage": "denied"})))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let response = client.mutate("/paste/new", None).await.unwrap();
    assert_eq!(response["code"], 403);
}

#[tokio::test]
async fn mutate_via_uses_given_page() {
    let server = MockServer::start().await;
    mount_csrf_page(&server, "/auth/login", "login-token", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/auth/userPassLogin"))
        .and(header("x-csrf-token", "login-token"))
        .respond_with(json_response(json!({"username": "kkksc03"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    client
        .mutate_via("/api/auth/userPassLogin", None, "/auth/login")
        .await
        .unwrap();
}
