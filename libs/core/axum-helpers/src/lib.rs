//! # Axum Helpers
//!
//! Utilities, middleware, and helpers shared by the HTTP services.
//!
//! ## Modules
//!
//! - **[`auth`]**: stateless JWT access/refresh tokens and the auth middleware
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`http`]**: HTTP middleware (CORS, security headers)
//! - **[`errors`]**: structured error responses with error codes
//! - **[`extractors`]**: custom extractors (integer id path)
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::{http::CorsConfig, server::{create_production_app, create_router}};
//! use core_config::{FromEnv, server::ServerConfig};
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api_routes = Router::new(); // Add your routes
//!     let router = create_router::<ApiDoc>(api_routes, &CorsConfig::from_env()?);
//!
//!     create_production_app(router, &ServerConfig::from_env()?, async {}).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{
    ACCESS_TOKEN_COOKIE, AuthError, IssuedTokens, JwtAuth, JwtClaims, JwtConfig, TokenType,
    jwt_auth_middleware, session_cookie,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks,
};

pub use http::{CorsConfig, create_cors_layer, security_headers};

pub use errors::{
    AppError, ErrorCode, ErrorListResponse, ErrorResponse, FieldErrors, MessageResponse,
};

pub use extractors::IdPath;
