//! Token signing configuration.

use super::jwt::{ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL};
use core_config::{ConfigError, FromEnv, env_or_default, env_required};

const MIN_SECRET_LEN: usize = 32;

/// JWT authentication configuration.
///
/// Loaded from environment variables:
/// - `JWT_SECRET` (required) - at least 32 characters
/// - `JWT_ACCESS_TTL_SECS` (default 900)
/// - `JWT_REFRESH_TTL_SECS` (default 604800)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

fn check_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::ParseError {
            key: "JWT_SECRET".to_string(),
            details: format!(
                "must be at least {} characters (got {}). Generate one with: openssl rand -base64 32",
                MIN_SECRET_LEN,
                secret.len()
            ),
        });
    }
    Ok(())
}

fn parse_ttl(key: &str, default: i64) -> Result<i64, ConfigError> {
    let raw = env_or_default(key, &default.to_string());
    match raw.parse::<i64>() {
        Ok(ttl) if ttl > 0 => Ok(ttl),
        Ok(ttl) => Err(ConfigError::ParseError {
            key: key.to_string(),
            details: format!("must be positive (got {})", ttl),
        }),
        Err(e) => Err(ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
    }
}

impl JwtConfig {
    /// Config with the default token lifetimes.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        check_secret(&secret)?;

        Ok(Self {
            secret,
            access_ttl_secs: ACCESS_TOKEN_TTL,
            refresh_ttl_secs: REFRESH_TOKEN_TTL,
        })
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        check_secret(&secret)?;

        Ok(Self {
            secret,
            access_ttl_secs: parse_ttl("JWT_ACCESS_TTL_SECS", ACCESS_TOKEN_TTL)?,
            refresh_ttl_secs: parse_ttl("JWT_REFRESH_TTL_SECS", REFRESH_TOKEN_TTL)?,
        })
    }
}
