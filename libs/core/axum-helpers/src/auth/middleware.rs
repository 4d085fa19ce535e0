use super::jwt::{JwtAuth, TokenType};
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Name of the cookie carrying the access token after login.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Extract JWT from Authorization header or cookie
fn extract_token(headers: &HeaderMap) -> Option<String> {
    // "Authorization: Bearer <token>" wins over the cookie
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .or_else(|| {
            headers
                .get("cookie")
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == ACCESS_TOKEN_COOKIE).then(|| value.to_string())
                    })
                })
        })
        .filter(|token| !token.is_empty())
}

/// `Set-Cookie` value for the login session.
///
/// `secure` adds the `Secure` attribute (production only).
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let secure_flag = if secure { " Secure;" } else { "" };
    format!(
        "{}={}; HttpOnly;{} SameSite=Strict; Path=/; Max-Age={}",
        ACCESS_TOKEN_COOKIE, token, secure_flag, max_age_secs
    )
}

/// JWT authentication middleware
///
/// Accepts an access token from the Authorization header or the session
/// cookie and inserts its [`JwtClaims`](super::JwtClaims) into the request
/// extensions. Runs before any extractor of the wrapped handler, so rejected
/// requests never reach body parsing or validation.
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_token(request.headers()) else {
        tracing::debug!("No JWT found in Authorization header or cookie");
        return Err(AppError::Unauthorized("No token provided".to_string()));
    };

    let claims = auth.verify(&token, TokenType::Access).map_err(|e| {
        tracing::debug!("JWT verification failed: {}", e);
        AppError::InvalidToken("Invalid token".to_string())
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtClaims, JwtConfig};
    use axum::{
        Extension, Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode, header},
        routing::get,
    };
    use tower::ServiceExt;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("this-is-a-valid-secret-with-32-chars!").unwrap())
    }

    fn app(auth: JwtAuth) -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|Extension(claims): Extension<JwtClaims>| async move { claims.username }),
            )
            .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware))
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let response = app(auth())
            .oneshot(HttpRequest::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bearer_token_is_accepted() {
        let auth = auth();
        let token = auth.create_access_token("7", "carol").unwrap();

        let response = app(auth)
            .oneshot(
                HttpRequest::get("/whoami")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cookie_token_is_accepted() {
        let auth = auth();
        let token = auth.create_access_token("7", "carol").unwrap();

        let response = app(auth)
            .oneshot(
                HttpRequest::get("/whoami")
                    .header(header::COOKIE, format!("theme=dark; access_token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_refresh_token_is_rejected() {
        let auth = auth();
        let token = auth.create_refresh_token("7", "carol").unwrap();

        let response = app(auth)
            .oneshot(
                HttpRequest::get("/whoami")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_session_cookie_flags() {
        let cookie = session_cookie("abc", 900, true);
        assert!(cookie.starts_with("access_token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.ends_with("Max-Age=900"));

        assert!(!session_cookie("abc", 900, false).contains("Secure"));
    }
}
