mod support;

use axum::{body::Body, http::Request, http::StatusCode};
use serde_json::json;
use uuid::Uuid;

use support::{app, get_request, json_request, lazy_pool, send};
use taxi_dispatch::models::user::UserRole;
use taxi_dispatch::utils::jwt::{generate_token, JwtConfig};

#[tokio::test]
async fn test_health_check() {
    let app = app(lazy_pool());
    let (status, body) = send(&app, get_request("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "taxi_dispatch");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = app(lazy_pool());

    for uri in ["/api/trips", "/api/vehicles", "/api/auth/me", "/api/reports/dashboard"] {
        let (status, body) = send(&app, get_request(uri, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());
    }
}

#[tokio::test]
async fn test_malformed_authorization_header() {
    let app = app(lazy_pool());
    let request = Request::builder()
        .uri("/api/trips")
        .header("authorization", "Token abc")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = app(lazy_pool());
    let (status, body) = send(&app, get_request("/api/trips", Some("not-a-jwt"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_token_signed_with_another_secret_is_rejected() {
    let app = app(lazy_pool());
    let foreign = JwtConfig {
        secret: "some-other-secret".to_string(),
        expiration: 3600,
    };
    let token = generate_token(Uuid::new_v4(), UserRole::Admin, &foreign).unwrap();

    let (status, _) = send(&app, get_request("/api/vehicles", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_malformed_json() {
    let app = app(lazy_pool());
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{\"username\": "))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_login_validates_before_querying() {
    let app = app(lazy_pool());
    let (status, body) = send(
        &app,
        json_request("POST", "/api/auth/login", None, &json!({ "username": "", "password": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = app(lazy_pool());
    let (status, _) = send(&app, get_request("/api/does-not-exist", None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
