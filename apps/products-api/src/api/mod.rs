//! API routes module

pub mod health;
pub mod products;
pub mod users;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create all API routes
///
/// Returns a stateless Router (all sub-routers have state already applied).
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .merge(products::router(state))
        .merge(users::router(state))
}

/// Creates a router with the /ready endpoint that checks the database.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum_helpers::{CorsConfig, JwtAuth, JwtConfig};
    use core_config::{app_info, server::ServerConfig};
    use database::postgres::PostgresConfig;
    use http_body_util::BodyExt;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = Config {
            app: app_info!(),
            database: PostgresConfig::new("postgresql://localhost/unused"),
            server: ServerConfig::new("127.0.0.1", 0),
            jwt: JwtConfig::new("wiring-test-secret-with-at-least-32-chars").unwrap(),
            cors: CorsConfig::parse("http://localhost:3000").unwrap(),
            environment: Environment::Development,
            run_migrations: false,
        };
        let state = AppState {
            jwt_auth: JwtAuth::new(&config.jwt),
            db: MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            config,
        };

        axum_helpers::create_router::<crate::openapi::ApiDoc>(routes(&state), &state.config.cors)
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_product_routes_require_a_token() {
        let (status, body) = send(
            Request::post("/products/register/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "No token provided");

        let (status, body) = send(
            Request::get("/products/")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid token");
    }

    #[tokio::test]
    async fn test_account_routes_are_open() {
        let (status, body) = send(
            Request::post("/login/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"username": "test_user"}"#))
                .unwrap(),
        )
        .await;

        // reached validation, not the auth middleware
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["password"][0], "This field is required.");
    }

    #[tokio::test]
    async fn test_unknown_route_uses_error_envelope() {
        let (status, body) = send(Request::get("/nope").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let (status, body) = send(
            Request::get("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/products/"].is_object());
    }
}
