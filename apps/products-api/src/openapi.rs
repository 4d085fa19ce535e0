//! OpenAPI documentation configuration

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Merges the domain documents (their paths are already absolute) and adds
/// the bearer token scheme referenced by the product endpoints.
struct DomainApis;

impl Modify for DomainApis {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.merge(domain_products::handlers::ApiDoc::openapi());
        openapi.merge(domain_users::handlers::ApiDoc::openapi());

        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                Http::builder()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token from POST /login/. The `access_token` cookie is accepted too.",
                    ))
                    .build(),
            ),
        );
    }
}

/// Combined OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    modifiers(&DomainApis),
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Products API",
        version = "0.1.0",
        description = "Product registration and user accounts with token-based login"
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    )
)]
pub struct ApiDoc;
