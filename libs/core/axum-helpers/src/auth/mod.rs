//! Bearer-token authentication.
//!
//! - [`JwtConfig`]: signing secret and token lifetimes from the environment
//! - [`JwtAuth`]: issues and verifies HS256 access/refresh tokens
//! - [`jwt_auth_middleware`]: rejects requests without a valid access token
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, jwt_auth_middleware};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let protected = Router::new()
//!     .route("/products/", get(list_products))
//!     .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use jwt::{
    ACCESS_TOKEN_TTL, AuthError, IssuedTokens, JwtAuth, JwtClaims, REFRESH_TOKEN_TTL, TokenType,
};
pub use middleware::{ACCESS_TOKEN_COOKIE, jwt_auth_middleware, session_cookie};
