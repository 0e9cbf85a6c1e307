#![cfg(not(coverage))]

use super::test_support::mock::{MockServer, DELETE, GET, POST};
use super::*;
use serde_json::json;

fn user_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Alice Example",
        "email": "alice@example.com"
    })
}

fn session_json(id: &str, token: &str) -> serde_json::Value {
    json!({
        "id": id,
        "sessionToken": token,
        "deviceInfo": {"browser": "Firefox", "os": "Linux", "device": "Desktop"},
        "ipAddress": "10.0.0.1",
        "createdAt": "2025-01-02T10:00:00Z",
        "lastActivity": "2025-01-02T10:05:00Z",
        "expiresAt": "2025-01-02T10:10:00Z"
    })
}

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new_with_token(server.url("/api"), "tok-current")
}

#[tokio::test]
async fn login_unwraps_envelope_payload() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(200).json_body(json!({
            "success": true,
            "data": {"user": user_json("u1"), "accessToken": "tok-1"}
        }));
    });

    let client = ApiClient::new_with_base_url(server.url("/api"));
    let payload = client
        .login(&LoginRequest {
            email: "alice@example.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();
    assert_eq!(payload.access_token, "tok-1");
    assert_eq!(payload.user.id, "u1");
}

#[tokio::test]
async fn login_failure_surfaces_server_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(401).json_body(json!({
            "success": false,
            "message": "Invalid email or password"
        }));
    });

    let client = ApiClient::new_with_base_url(server.url("/api"));
    let err = client
        .login(&LoginRequest {
            email: "alice@example.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();
    match err {
        ApiError::Server {
            status, message, ..
        } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn expired_session_code_maps_to_session_expired() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/auth/me");
        then.status(401).json_body(json!({
            "success": false,
            "code": "SESSION_EXPIRED",
            "message": "Session expired"
        }));
    });

    let err = client_for(&server).get_me().await.unwrap_err();
    assert!(err.is_session_expired());
}

#[tokio::test]
async fn plain_unauthorized_is_not_session_expired() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/auth/me");
        then.status(401).json_body(json!({
            "success": false,
            "message": "Unauthorized"
        }));
    });

    let err = client_for(&server).get_me().await.unwrap_err();
    assert!(!err.is_session_expired());
}

#[tokio::test]
async fn session_config_falls_back_is_callers_job_but_parses_when_present() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/auth/config");
        then.status(200).json_body(json!({
            "success": true,
            "data": {"sessionTimeoutMs": 600000}
        }));
    });

    let config = client_for(&server).get_session_config().await.unwrap();
    assert_eq!(config.session_timeout_ms, 600_000);
}

#[tokio::test]
async fn list_sessions_parses_device_records() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/auth/sessions");
        then.status(200).json_body(json!({
            "success": true,
            "data": [session_json("s1", "tok-current"), session_json("s2", "tok-other")]
        }));
    });

    let sessions = client_for(&server).list_sessions().await.unwrap();
    assert_eq!(sessions.len(), 2);
    assert!(sessions[0].is_current("tok-current"));
    assert!(!sessions[1].is_current("tok-current"));
}

#[tokio::test]
async fn revoke_session_accepts_empty_success_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(DELETE).path("/api/auth/sessions/s2");
        then.status(200).json_body(json!({"success": true}));
    });

    client_for(&server).revoke_session("s2").await.unwrap();
}

#[tokio::test]
async fn logout_survives_a_credential_clear_before_first_poll() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/logout");
        then.status(200).json_body(json!({"success": true}));
    });

    // The logout funnel creates this future, then clears the shared token
    // cell synchronously before the future runs.
    let client = ApiClient::new_with_token(server.url("/api"), "tok-current");
    let token = client.access_token().unwrap();
    let pending = client.logout_with_token(token);
    client.set_access_token(None);

    pending.await.unwrap();
}

#[tokio::test]
async fn logout_without_token_is_a_storage_error() {
    let server = MockServer::start();
    let client = ApiClient::new_with_base_url(server.url("/api"));
    let err = client.logout().await.unwrap_err();
    assert!(matches!(err, ApiError::Storage(_)));
}
