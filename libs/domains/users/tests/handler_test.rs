//! Handler tests for the users domain
//!
//! Drive registration, login and token refresh through the router with the
//! in-memory repository.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use axum_helpers::{JwtAuth, JwtConfig, TokenType};
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

const SECRET: &str = "handler-test-secret-with-at-least-32-chars";

fn jwt_auth() -> JwtAuth {
    JwtAuth::new(&JwtConfig::new(SECRET).unwrap())
}

fn app(secure_cookies: bool) -> Router {
    handlers::router(AuthState {
        service: UserService::new(InMemoryUserRepository::new()),
        jwt_auth: jwt_auth(),
        secure_cookies,
    })
}

fn user_data() -> Value {
    json!({"username": "test_user", "password": "test_password"})
}

async fn post(app: &Router, uri: &str, body: Value) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_user() {
    let app = app(false);

    let response = post(&app, "/register/", user_data()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["username"], "test_user");
    assert!(body["id"].as_str().is_some());
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = app(false);
    post(&app, "/register/", user_data()).await;

    let response = post(&app, "/register/", user_data()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"username": ["A user with that username already exists."]})
    );
}

#[tokio::test]
async fn test_register_missing_password() {
    let response = post(&app(false), "/register/", json!({"username": "test_user"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"password": ["This field is required."]})
    );
}

#[tokio::test]
async fn test_register_invalid_username() {
    let response = post(
        &app(false),
        "/register/",
        json!({"username": "no spaces allowed", "password": "pw"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(
        body["username"][0]
            .as_str()
            .unwrap()
            .starts_with("Enter a valid username.")
    );
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_user() {
    let app = app(false);
    post(&app, "/register/", user_data()).await;

    let response = post(&app, "/login/", user_data()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("access_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(!cookie.contains("Secure"));

    let body = json_body(response).await;
    assert_eq!(body["message"], "Login successful");

    let auth = jwt_auth();
    let access = auth
        .verify(body["access_token"].as_str().unwrap(), TokenType::Access)
        .unwrap();
    assert_eq!(access.username, "test_user");
    assert!(
        auth.verify(body["refresh_token"].as_str().unwrap(), TokenType::Refresh)
            .is_ok()
    );
}

#[tokio::test]
async fn test_login_cookie_is_secure_in_production() {
    let app = app(true);
    post(&app, "/register/", user_data()).await;

    let response = post(&app, "/login/", user_data()).await;
    let cookie = response.headers().get(header::SET_COOKIE).unwrap();

    assert!(cookie.to_str().unwrap().contains("Secure"));
}

#[tokio::test]
async fn test_login_with_invalid_credentials() {
    let app = app(false);
    post(&app, "/register/", user_data()).await;

    for body in [
        json!({"username": "invalid-user", "password": "invalid-password"}),
        json!({"username": "test_user", "password": "wrong_password"}),
    ] {
        let response = post(&app, "/login/", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(
            json_body(response).await,
            json!({"message": "Invalid credentials"})
        );
    }
}

#[tokio::test]
async fn test_login_missing_field() {
    let response = post(&app(false), "/login/", json!({"username": "test-user"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"password": ["This field is required."]})
    );
}

// ============================================================================
// Token refresh
// ============================================================================

#[tokio::test]
async fn test_refresh_issues_access_token() {
    let app = app(false);
    post(&app, "/register/", user_data()).await;
    let login = json_body(post(&app, "/login/", user_data()).await).await;

    let response = post(
        &app,
        "/token/refresh/",
        json!({"refresh_token": login["refresh_token"]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let claims = jwt_auth()
        .verify(body["access_token"].as_str().unwrap(), TokenType::Access)
        .unwrap();
    assert_eq!(claims.username, "test_user");
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let app = app(false);
    post(&app, "/register/", user_data()).await;
    let login = json_body(post(&app, "/login/", user_data()).await).await;

    let response = post(
        &app,
        "/token/refresh/",
        json!({"refresh_token": login["access_token"]}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["message"], "Invalid token");
}

#[tokio::test]
async fn test_refresh_rejects_garbage_and_missing_field() {
    let app = app(false);

    let response = post(&app, "/token/refresh/", json!({"refresh_token": "not.a.jwt"})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post(&app, "/token/refresh/", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"refresh_token": ["This field is required."]})
    );
}

#[tokio::test]
async fn test_refresh_for_unknown_user_is_rejected() {
    // signed with the right key but for an account this app never created
    let token = jwt_auth()
        .create_refresh_token(&uuid::Uuid::new_v4().to_string(), "ghost")
        .unwrap();

    let response = post(&app(false), "/token/refresh/", json!({"refresh_token": token})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
