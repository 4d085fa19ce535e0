//! Products API routes

use axum::{Router, middleware};
use axum_helpers::jwt_auth_middleware;
use domain_products::{PgProductRepository, ProductService, handlers};

use crate::state::AppState;

/// Product routes, all behind the JWT middleware
///
/// `route_layer` so unmatched paths still fall through to the 404 fallback.
pub fn router(state: &AppState) -> Router {
    let repository = PgProductRepository::new(state.db.clone());
    let service = ProductService::new(repository);

    handlers::router(service).route_layer(middleware::from_fn_with_state(
        state.jwt_auth.clone(),
        jwt_auth_middleware,
    ))
}
