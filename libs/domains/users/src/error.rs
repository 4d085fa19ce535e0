use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::{
    AppError, AuthError,
    errors::{FieldErrors, MessageResponse},
};
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User with username '{0}' already exists")]
    DuplicateUsername(String),

    /// Rendered as `{"field": ["message", ...]}`
    #[error("Invalid input: {0:?}")]
    Validation(FieldErrors),

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, expired or wrong-type refresh token
    #[error("Invalid token")]
    InvalidToken,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DuplicateUsername(username) => AppError::Conflict(format!(
                "User with username '{}' already exists",
                username
            )),
            UserError::InvalidToken => AppError::InvalidToken("Invalid token".to_string()),
            UserError::Database(e) => AppError::Database(e),
            UserError::PasswordHash(msg) | UserError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
            UserError::Token(e) => AppError::InternalServerError(e.to_string()),
            other @ (UserError::Validation(_) | UserError::InvalidCredentials) => {
                AppError::BadRequest(other.to_string())
            }
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        match self {
            UserError::Validation(errors) => {
                tracing::info!(?errors, "User input rejected");
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            UserError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                Json(MessageResponse::new("Invalid credentials")),
            )
                .into_response(),
            other => AppError::from(other).into_response(),
        }
    }
}
