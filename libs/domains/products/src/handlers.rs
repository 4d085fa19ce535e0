use axum::{
    Json, Router,
    extract::{OriginalUri, Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use axum_helpers::{
    ErrorResponse, IdPath,
    errors::{
        ErrorListResponse, MessageResponse, single_field_error,
        responses::{InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse},
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{ProductError, ProductResult};
use crate::models::{ListProductsQuery, Product, ProductPage, RegisterProduct, UpdateProduct};
use crate::pagination::PageRequest;
use crate::repository::ProductRepository;
use crate::service::ProductService;

pub const TAG: &str = "products";

/// Key under which body-level (non field) errors are reported.
const NON_FIELD_ERRORS: &str = "non_field_errors";

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        register_product,
        list_products,
        get_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(
            Product,
            RegisterProduct,
            UpdateProduct,
            ProductPage,
            ErrorListResponse,
            MessageResponse,
            ErrorResponse
        ),
        responses(UnauthorizedResponse, NotFoundResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = TAG, description = "Product registration and management")
    )
)]
pub struct ApiDoc;

/// Create the product router with all HTTP endpoints.
///
/// Every route requires authentication; the caller layers the auth
/// middleware on top.
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/products/register/", post(register_product))
        .route("/products/", get(list_products))
        .route(
            "/products/{id}/",
            get(get_product)
                .put(update_product)
                .patch(update_product)
                .delete(delete_product),
        )
        .with_state(shared_service)
}

/// Register a new product
#[utoipa::path(
    post,
    path = "/products/register/",
    tag = TAG,
    request_body = RegisterProduct,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Product registered", body = Product),
        (status = 400, description = "Validation failed, as `field: message` strings", body = ErrorListResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    payload: Result<Json<RegisterProduct>, JsonRejection>,
) -> ProductResult<(StatusCode, Json<Product>)> {
    let Json(input) = payload.map_err(|rejection| {
        ProductError::Registration(single_field_error(NON_FIELD_ERRORS, rejection.body_text()))
    })?;

    let product = service.register_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// List products, filtered and paginated
#[utoipa::path(
    get,
    path = "/products/",
    tag = TAG,
    params(ListProductsQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "One page of products", body = ProductPage),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, description = "Invalid page", body = ErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ListProductsQuery>,
) -> ProductResult<Json<ProductPage>> {
    let page = PageRequest::from_query(query.page.as_deref(), query.page_size.as_deref())?;
    let (count, products) = service
        .list_products(query.filter(), query.ordering(), page)
        .await?;

    Ok(Json(ProductPage::new(
        count,
        products,
        page,
        uri.path(),
        uri.query(),
    )))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/products/{id}/",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> ProductResult<Json<Product>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Partially update a product (PUT and PATCH behave the same)
#[utoipa::path(
    method(put, patch),
    path = "/products/{id}/",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Field errors as `{field: [message]}`, or `{\"message\": \"Validation failed\"}` when manufacturer or date_of_manufacture is present", body = MessageResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
    payload: Result<Json<UpdateProduct>, JsonRejection>,
) -> ProductResult<Json<Product>> {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            // a missing product is reported before a malformed body
            service.get_product(id).await?;
            return Err(ProductError::InvalidUpdate(single_field_error(
                NON_FIELD_ERRORS,
                rejection.body_text(),
            )));
        }
    };

    let product = service.update_product(id, input).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/products/{id}/",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Product deleted", body = MessageResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> ProductResult<(StatusCode, Json<MessageResponse>)> {
    service.delete_product(id).await?;
    Ok((
        StatusCode::NO_CONTENT,
        Json(MessageResponse::new("Product Deleted")),
    ))
}
