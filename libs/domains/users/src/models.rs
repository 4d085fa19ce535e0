use axum_helpers::errors::{FieldErrors, field_error_map};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const DUPLICATE_USERNAME_MESSAGE: &str = "A user with that username already exists.";
const INVALID_USERNAME_MESSAGE: &str =
    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";

/// Letters, digits and `@ . + - _`
static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").unwrap());

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error_with_message("blank", "This field may not be blank."));
    }
    Ok(())
}

fn valid_username(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    if !USERNAME_RE.is_match(value) {
        return Err(error_with_message("invalid_username", INVALID_USERNAME_MESSAGE));
    }
    Ok(())
}

/// A stored account, including its password hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Argon2 PHC string, never exposed in API responses
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Registration payload.
///
/// Fields are optional so a missing field becomes a field error.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(
        required(message = "This field is required."),
        length(max = 150, message = "Ensure this field has no more than 150 characters."),
        custom(function = "valid_username")
    )]
    #[schema(example = "test_user")]
    pub username: Option<String>,
    #[validate(
        required(message = "This field is required."),
        length(max = 128, message = "Ensure this field has no more than 128 characters."),
        custom(function = "not_blank")
    )]
    #[schema(example = "test_password")]
    pub password: Option<String>,
}

/// Validated registration input
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Validates both fields and hands back the plain values.
fn credentials(
    payload: &impl Validate,
    username: Option<String>,
    password: Option<String>,
) -> Result<Credentials, FieldErrors> {
    payload.validate().map_err(|e| field_error_map(&e))?;

    match (username, password) {
        (Some(username), Some(password)) => Ok(Credentials { username, password }),
        // required() already reported missing fields
        _ => Err(FieldErrors::new()),
    }
}

impl RegisterUser {
    pub fn into_credentials(self) -> Result<Credentials, FieldErrors> {
        credentials(&self, self.username.clone(), self.password.clone())
    }
}

/// Login payload
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank")
    )]
    #[schema(example = "test_user")]
    pub username: Option<String>,
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank")
    )]
    #[schema(example = "test_password")]
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn into_credentials(self) -> Result<Credentials, FieldErrors> {
        credentials(&self, self.username.clone(), self.password.clone())
    }
}

/// Refresh payload
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank")
    )]
    pub refresh_token: Option<String>,
}

/// Public view of a user (no password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = "Login successful")]
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access_token: String,
}
