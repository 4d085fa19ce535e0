use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT token time-to-live constants
pub const ACCESS_TOKEN_TTL: i64 = 900; // 15 minutes
pub const REFRESH_TOKEN_TTL: i64 = 604800; // 7 days

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,           // Subject (user ID)
    pub username: String,      // Login name
    pub token_type: TokenType, // Access or refresh
    pub exp: i64,              // Expiration time
    pub iat: i64,              // Issued at
    pub jti: String,           // JWT ID
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("expected a {expected:?} token")]
    WrongTokenType { expected: TokenType },
}

/// Access + refresh pair handed out at login.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Stateless HS256 token issuer/verifier.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        tracing::info!(
            access_ttl_secs = config.access_ttl_secs,
            refresh_ttl_secs = config.refresh_ttl_secs,
            "JWT auth initialized"
        );

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            access_ttl: config.access_ttl_secs,
            refresh_ttl: config.refresh_ttl_secs,
        }
    }

    /// Lifetime of access tokens in seconds (also the session cookie Max-Age).
    pub fn access_ttl(&self) -> i64 {
        self.access_ttl
    }

    pub fn create_access_token(&self, user_id: &str, username: &str) -> Result<String, AuthError> {
        self.create_token(user_id, username, TokenType::Access, self.access_ttl)
    }

    pub fn create_refresh_token(&self, user_id: &str, username: &str) -> Result<String, AuthError> {
        self.create_token(user_id, username, TokenType::Refresh, self.refresh_ttl)
    }

    /// Issue both tokens for a freshly authenticated user.
    pub fn issue_pair(&self, user_id: &str, username: &str) -> Result<IssuedTokens, AuthError> {
        Ok(IssuedTokens {
            access_token: self.create_access_token(user_id, username)?,
            refresh_token: self.create_refresh_token(user_id, username)?,
        })
    }

    fn create_token(
        &self,
        user_id: &str,
        username: &str,
        token_type: TokenType,
        ttl_seconds: i64,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            token_type,
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    /// Verify signature and expiry, returning the claims of any token type.
    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        decode::<JwtClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(AuthError::InvalidToken)
    }

    /// Verify a token and require it to be of `expected` type.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<JwtClaims, AuthError> {
        let claims = self.verify_token(token)?;
        if claims.token_type != expected {
            return Err(AuthError::WrongTokenType { expected });
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("this-is-a-valid-secret-with-32-chars!").unwrap())
    }

    #[test]
    fn test_access_token_round_trip() {
        let auth = auth();
        let token = auth.create_access_token("42", "alice").unwrap();

        let claims = auth.verify(&token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_TTL);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let auth = auth();
        let tokens = auth.issue_pair("42", "alice").unwrap();

        assert!(matches!(
            auth.verify(&tokens.refresh_token, TokenType::Access),
            Err(AuthError::WrongTokenType {
                expected: TokenType::Access
            })
        ));
        assert!(auth.verify(&tokens.refresh_token, TokenType::Refresh).is_ok());
    }

    #[test]
    fn test_each_token_gets_a_unique_jti() {
        let auth = auth();
        let a = auth.verify_token(&auth.create_access_token("1", "a").unwrap()).unwrap();
        let b = auth.verify_token(&auth.create_access_token("1", "a").unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = JwtAuth::new(&JwtConfig::new("another-valid-secret-with-32-chars!!").unwrap());
        let token = other.create_access_token("1", "mallory").unwrap();

        assert!(matches!(
            auth().verify_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = auth();
        // well past the default 60s leeway
        let token = auth
            .create_token("1", "old", TokenType::Access, -3600)
            .unwrap();

        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(auth().verify_token("not.a.jwt").is_err());
    }
}
