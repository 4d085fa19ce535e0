use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Response},
    routing::post,
};
use axum_helpers::{
    ErrorResponse, JwtAuth, TokenType,
    errors::{
        MessageResponse, field_error_map, responses::InternalServerErrorResponse,
        single_field_error,
    },
    session_cookie,
};
use std::sync::Arc;
use utoipa::OpenApi;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{
    AccessTokenResponse, LoginRequest, LoginResponse, RefreshRequest, RegisterUser, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "users";

const NON_FIELD_ERRORS: &str = "non_field_errors";

/// OpenAPI documentation for the account endpoints
#[derive(OpenApi)]
#[openapi(
    paths(register, login, refresh_token),
    components(
        schemas(
            RegisterUser,
            LoginRequest,
            RefreshRequest,
            UserResponse,
            LoginResponse,
            AccessTokenResponse,
            MessageResponse,
            ErrorResponse
        ),
        responses(InternalServerErrorResponse)
    ),
    tags(
        (name = TAG, description = "Account registration and token issuance")
    )
)]
pub struct ApiDoc;

/// Application state for the account handlers
pub struct AuthState<R: UserRepository> {
    pub service: UserService<R>,
    pub jwt_auth: JwtAuth,
    /// Adds `Secure` to the session cookie (production)
    pub secure_cookies: bool,
}

/// Create the account router. None of these routes require authentication.
pub fn router<R: UserRepository + 'static>(state: AuthState<R>) -> Router {
    Router::new()
        .route("/register/", post(register))
        .route("/login/", post(login))
        .route("/token/refresh/", post(refresh_token))
        .with_state(Arc::new(state))
}

/// Unwraps a JSON body, reporting a malformed one as a non-field error.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> UserResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            UserError::Validation(single_field_error(NON_FIELD_ERRORS, rejection.body_text()))
        })
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/register/",
    tag = TAG,
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Field errors as `{field: [message]}`", body = std::collections::BTreeMap<String, Vec<String>>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(state): State<Arc<AuthState<R>>>,
    payload: Result<Json<RegisterUser>, JsonRejection>,
) -> UserResult<(StatusCode, Json<UserResponse>)> {
    let input = json_body(payload)?;
    let user = state.service.register(input).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Log in with username and password
///
/// Returns both tokens and sets the `access_token` session cookie.
#[utoipa::path(
    post,
    path = "/login/",
    tag = TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse,
            headers(("set-cookie" = String, description = "HttpOnly `access_token` session cookie"))),
        (status = 400, description = "`{\"message\": \"Invalid credentials\"}` or field errors", body = MessageResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(state): State<Arc<AuthState<R>>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> UserResult<Response> {
    let input = json_body(payload)?;
    let user = state.service.authenticate(input).await?;

    let tokens = state
        .jwt_auth
        .issue_pair(&user.id.to_string(), &user.username)?;

    let cookie = session_cookie(
        &tokens.access_token,
        state.jwt_auth.access_ttl(),
        state.secure_cookies,
    );
    let cookie_header = HeaderValue::from_str(&cookie)
        .map_err(|e| UserError::Internal(format!("Failed to create cookie: {}", e)))?;

    let response = LoginResponse {
        message: "Login successful".to_string(),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    };

    Ok((AppendHeaders([(header::SET_COOKIE, cookie_header)]), Json(response)).into_response())
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/token/refresh/",
    tag = TAG,
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 400, description = "Field errors as `{field: [message]}`", body = std::collections::BTreeMap<String, Vec<String>>),
        (status = 401, description = "Invalid, expired or non-refresh token", body = ErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn refresh_token<R: UserRepository>(
    State(state): State<Arc<AuthState<R>>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> UserResult<Json<AccessTokenResponse>> {
    let input = json_body(payload)?;
    input
        .validate()
        .map_err(|e| UserError::Validation(field_error_map(&e)))?;
    let token = input.refresh_token.unwrap_or_default();

    let claims = state
        .jwt_auth
        .verify(&token, TokenType::Refresh)
        .map_err(|e| {
            tracing::debug!("Refresh token rejected: {}", e);
            UserError::InvalidToken
        })?;

    let user = state.service.token_subject(&claims.sub).await?;
    let access_token = state
        .jwt_auth
        .create_access_token(&user.id.to_string(), &user.username)?;

    Ok(Json(AccessTokenResponse { access_token }))
}
