use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::errors::single_field_error;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{DUPLICATE_USERNAME_MESSAGE, LoginRequest, RegisterUser, User};
use crate::repository::UserRepository;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

fn duplicate_username() -> UserError {
    UserError::Validation(single_field_error("username", DUPLICATE_USERNAME_MESSAGE))
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create an account with an argon2-hashed password
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterUser) -> UserResult<User> {
        let credentials = input.into_credentials().map_err(UserError::Validation)?;

        if self
            .repository
            .username_exists(&credentials.username)
            .await?
        {
            return Err(duplicate_username());
        }

        let password_hash = hash_password(&credentials.password)?;
        let user = User::new(credentials.username, password_hash);

        // a concurrent registration can still win the unique index
        match self.repository.create(user).await {
            Err(UserError::DuplicateUsername(_)) => Err(duplicate_username()),
            other => other,
        }
    }

    /// Verify user credentials (for login)
    ///
    /// Unknown usernames and wrong passwords are indistinguishable.
    #[instrument(skip(self, input))]
    pub async fn authenticate(&self, input: LoginRequest) -> UserResult<User> {
        let credentials = input.into_credentials().map_err(UserError::Validation)?;

        let Some(user) = self
            .repository
            .get_by_username(&credentials.username)
            .await?
        else {
            tracing::info!(username = %credentials.username, "Login for unknown user");
            return Err(UserError::InvalidCredentials);
        };

        if !verify_password(&credentials.password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Login with wrong password");
            return Err(UserError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Resolve the subject of a verified refresh token to a live account
    #[instrument(skip(self))]
    pub async fn token_subject(&self, sub: &str) -> UserResult<User> {
        let id = Uuid::parse_str(sub).map_err(|_| UserError::InvalidToken)?;

        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::InvalidToken)
    }
}

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
