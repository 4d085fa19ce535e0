//! Users Domain
//!
//! Account registration and token-based login.
//!
//! # Features
//!
//! - Registration with username/password (Argon2 password hashing)
//! - Login issuing an access/refresh token pair and a session cookie
//! - Access token refresh
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, token issuance, session cookie
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, password hashing, credential checks
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory and Postgres implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← User, request/response DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_users::{handlers, AuthState, InMemoryUserRepository, UserService};
//!
//! let state = AuthState {
//!     service: UserService::new(InMemoryUserRepository::new()),
//!     jwt_auth: JwtAuth::new(&JwtConfig::new(secret)?),
//!     secure_cookies: false,
//! };
//! let router = handlers::router(state);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{UserError, UserResult};
pub use handlers::AuthState;
pub use models::{LoginRequest, RefreshRequest, RegisterUser, User, UserResponse};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
