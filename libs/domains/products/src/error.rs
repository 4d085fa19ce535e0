use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::{
    AppError,
    errors::{ErrorListResponse, FieldErrors, MessageResponse, flatten_field_errors},
};
use sea_orm::DbErr;
use thiserror::Error;

use crate::models::PRODUCT_FIELDS;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(i32),

    #[error("Product with serial number '{0}' already exists")]
    DuplicateSerial(String),

    /// Rendered as `{"errors": ["field: message", ...]}`
    #[error("Invalid product registration: {0:?}")]
    Registration(FieldErrors),

    /// Rendered as `{"field": ["message", ...]}`
    #[error("Invalid product update: {0:?}")]
    InvalidUpdate(FieldErrors),

    #[error("Validation failed")]
    ImmutableField,

    #[error("Invalid page")]
    InvalidPage,

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::DuplicateSerial(serial) => AppError::Conflict(format!(
                "Product with serial number '{}' already exists",
                serial
            )),
            ProductError::InvalidPage => AppError::NotFound("Invalid page.".to_string()),
            ProductError::Database(e) => AppError::Database(e),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
            other @ (ProductError::Registration(_)
            | ProductError::InvalidUpdate(_)
            | ProductError::ImmutableField) => AppError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        match self {
            ProductError::Registration(errors) => {
                tracing::info!(?errors, "Product registration rejected");
                let body = ErrorListResponse {
                    errors: flatten_field_errors(&errors, PRODUCT_FIELDS),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ProductError::InvalidUpdate(errors) => {
                tracing::info!(?errors, "Product update rejected");
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            ProductError::ImmutableField => {
                tracing::info!("Product update touched manufacturer or date_of_manufacture");
                (
                    StatusCode::BAD_REQUEST,
                    Json(MessageResponse::new("Validation failed")),
                )
                    .into_response()
            }
            other => AppError::from(other).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_helpers::errors::single_field_error;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_registration_errors_follow_field_order() {
        let mut errors = single_field_error("serial_number", "already exists.");
        errors.insert("category".into(), vec!["This field is required.".into()]);

        let response = ProductError::Registration(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"errors": [
                "serial_number: already exists.",
                "category: This field is required."
            ]})
        );
    }

    #[tokio::test]
    async fn test_update_errors_are_a_field_map() {
        let response =
            ProductError::InvalidUpdate(single_field_error("name", "This field may not be blank."))
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"name": ["This field may not be blank."]})
        );
    }

    #[tokio::test]
    async fn test_immutable_field_message() {
        let response = ProductError::ImmutableField.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"message": "Validation failed"}));
    }

    #[tokio::test]
    async fn test_not_found_uses_envelope() {
        let response = ProductError::NotFound(3).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_invalid_page_message() {
        let response = ProductError::InvalidPage.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "Invalid page.");
    }
}
