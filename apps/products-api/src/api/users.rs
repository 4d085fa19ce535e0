use axum::Router;
use domain_users::{AuthState, PgUserRepository, UserService, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let auth_state = AuthState {
        service: UserService::new(PgUserRepository::new(state.db.clone())),
        jwt_auth: state.jwt_auth.clone(),
        secure_cookies: state.config.secure_cookies(),
    };

    handlers::router(auth_state)
}
