//! Application state management

use axum_helpers::JwtAuth;
use database::postgres::DatabaseConnection;

/// Shared application state
///
/// Cloning is cheap: the connection pool and signing keys are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: DatabaseConnection,
    pub jwt_auth: JwtAuth,
}
