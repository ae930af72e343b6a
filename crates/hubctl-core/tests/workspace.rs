//! Integration tests for calls against a running user server.

mod common;

use common::{hub_config, json_response, session};
use hubctl_core::HubErrorKind;
use hubctl_core::workspace::{
    FileUpload, create_terminal, mint_token, notebook_session, put_file, server_status,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_mint_token() {
    let hub = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hub/api/users/roboto/tokens"))
        .respond_with(json_response(201, &json!({"token": "scoped-token", "id": "a1"})))
        .expect(1)
        .mount(&hub)
        .await;

    let token = mint_token(&session(), &hub_config(&hub)).await.unwrap();
    assert_eq!(token, "scoped-token");
}

#[tokio::test]
async fn test_mint_token_without_token_field_is_parse_error() {
    let hub = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hub/api/users/roboto/tokens"))
        .respond_with(json_response(200, &json!({"id": "a1"})))
        .mount(&hub)
        .await;

    let err = mint_token(&session(), &hub_config(&hub)).await.unwrap_err();
    assert_eq!(err.kind, HubErrorKind::Parse);
}

#[tokio::test]
async fn test_notebook_session_uses_scoped_token() {
    let hub = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hub/api/users/roboto/tokens"))
        .respond_with(json_response(201, &json!({"token": "scoped-token"})))
        .mount(&hub)
        .await;
    Mock::given(method("POST"))
        .and(path("/user/roboto/api/terminals"))
        .and(header("authorization", "token scoped-token"))
        .respond_with(json_response(200, &json!({"name": "1"})))
        .expect(1)
        .mount(&hub)
        .await;

    let config = hub_config(&hub);
    let nb_session = notebook_session(&session(), &config).await.unwrap();
    let response = create_terminal(&nb_session, &config).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body["name"], "1");
}

#[tokio::test]
async fn test_put_text_file() {
    let hub = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/user/roboto/api/contents/.profile"))
        .and(body_json(json!({
            "path": "/home/jovyan/.profile",
            "name": ".profile",
            "content": "python automagic.py",
            "type": "file",
            "format": "text",
        })))
        .respond_with(json_response(201, &json!({"name": ".profile", "type": "file"})))
        .expect(1)
        .mount(&hub)
        .await;

    let upload = FileUpload::text(".profile", "python automagic.py");
    let response = put_file(&session(), &hub_config(&hub), &upload)
        .await
        .unwrap();
    assert!(response.is_success());
    assert_eq!(response.body["name"], ".profile");
}

#[tokio::test]
async fn test_put_binary_file_is_base64() {
    let hub = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/user/roboto/api/contents/automagic.py"))
        .and(body_json(json!({
            "path": "/home/jovyan/automagic.py",
            "name": "automagic.py",
            "content": "cHJpbnQoMSkK",
            "type": "file",
            "format": "base64",
        })))
        .respond_with(json_response(201, &json!({"name": "automagic.py"})))
        .expect(1)
        .mount(&hub)
        .await;

    let upload = FileUpload::binary("automagic.py", b"print(1)\n".to_vec());
    let response = put_file(&session(), &hub_config(&hub), &upload)
        .await
        .unwrap();
    assert_eq!(response.status, 201);
}

#[tokio::test]
async fn test_failed_upload_is_surfaced_not_raised() {
    let hub = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/user/roboto/api/contents/.profile"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&hub)
        .await;

    let upload = FileUpload::text(".profile", "x");
    let response = put_file(&session(), &hub_config(&hub), &upload)
        .await
        .unwrap();
    assert_eq!(response.status, 403);
    assert!(!response.is_success());
    assert_eq!(response.body, json!("Forbidden"));
}

#[tokio::test]
async fn test_server_status() {
    let hub = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/roboto/api/status"))
        .respond_with(json_response(200, &json!({"kernels": 0, "connections": 0})))
        .mount(&hub)
        .await;

    let server_url = format!("{}/user/roboto/", hub.uri());
    let status = server_status(&session(), &server_url).await.unwrap();
    assert!(status.contains("kernels"));
}

#[tokio::test]
async fn test_server_status_failure_is_http_error() {
    let hub = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/roboto/api/status"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&hub)
        .await;

    let server_url = format!("{}/user/roboto", hub.uri());
    let err = server_status(&session(), &server_url).await.unwrap_err();
    assert_eq!(err.status, Some(503));
}
