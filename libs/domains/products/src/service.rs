use std::sync::Arc;
use tracing::instrument;

use axum_helpers::errors::{FieldErrors, field_error_map, single_field_error};

use crate::error::{ProductError, ProductResult};
use crate::models::{
    DUPLICATE_SERIAL_MESSAGE, Product, ProductFilter, ProductOrdering, RegisterProduct,
    UpdateProduct,
};
use crate::pagination::PageRequest;
use crate::repository::ProductRepository;

/// Service layer for Product business logic
#[derive(Clone)]
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Validate and register a new product
    #[instrument(skip(self, input), fields(serial_number = ?input.serial_number))]
    pub async fn register_product(&self, input: RegisterProduct) -> ProductResult<Product> {
        let product = input
            .into_new_product()
            .map_err(|e| ProductError::Registration(field_error_map(&e)))?;

        if self
            .repository
            .exists_by_serial(&product.serial_number, None)
            .await?
        {
            return Err(duplicate_serial_registration());
        }

        self.repository
            .create(product)
            .await
            .map_err(|e| match e {
                // lost a race past the existence check
                ProductError::DuplicateSerial(_) => duplicate_serial_registration(),
                other => other,
            })
    }

    /// One page of products matching `filter` in the requested order, with
    /// the total match count
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
        ordering: ProductOrdering,
        page: PageRequest,
    ) -> ProductResult<(u64, Vec<Product>)> {
        let count = self.repository.count(&filter).await?;

        if page.page > page.num_pages(count) {
            return Err(ProductError::InvalidPage);
        }

        let products = self
            .repository
            .list(&filter, &ordering, page.offset(), page.page_size)
            .await?;

        Ok((count, products))
    }

    /// Get a product by ID
    pub async fn get_product(&self, id: i32) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Partially update a product.
    ///
    /// Field errors are reported first; only a field-valid payload is then
    /// refused for naming `manufacturer` or `date_of_manufacture`.
    #[instrument(skip(self, input), fields(product_id = id))]
    pub async fn update_product(&self, id: i32, input: UpdateProduct) -> ProductResult<Product> {
        self.get_product(id).await?;

        let mut errors = input.field_errors();
        if let Some(Some(ref serial)) = input.serial_number {
            if !errors.contains_key("serial_number")
                && self.repository.exists_by_serial(serial, Some(id)).await?
            {
                errors
                    .entry("serial_number".to_string())
                    .or_default()
                    .push(DUPLICATE_SERIAL_MESSAGE.to_string());
            }
        }

        if !errors.is_empty() {
            return Err(ProductError::InvalidUpdate(errors));
        }

        if input.touches_immutable_fields() {
            return Err(ProductError::ImmutableField);
        }

        self.repository
            .update(id, input.into_changes())
            .await
            .map_err(|e| match e {
                ProductError::DuplicateSerial(_) => ProductError::InvalidUpdate(
                    single_field_error("serial_number", DUPLICATE_SERIAL_MESSAGE),
                ),
                other => other,
            })
    }

    /// Delete a product
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i32) -> ProductResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(ProductError::NotFound(id));
        }

        Ok(())
    }
}

fn duplicate_serial_registration() -> ProductError {
    let errors: FieldErrors = single_field_error("serial_number", DUPLICATE_SERIAL_MESSAGE);
    ProductError::Registration(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewProduct;
    use crate::repository::MockProductRepository;
    use chrono::NaiveDate;
    use mockall::predicate::{always, eq};

    fn registration() -> RegisterProduct {
        RegisterProduct {
            name: Some("Test Product".into()),
            description: Some("Test Description".into()),
            manufacturer: Some("Test Manufacturer".into()),
            serial_number: Some("123456".into()),
            date_of_manufacture: Some("2024-01-01".into()),
            warranty_information: None,
            category: Some("Test Category".into()),
        }
    }

    fn stored(id: i32) -> Product {
        Product {
            id,
            name: "Test Product".into(),
            description: "Test Description".into(),
            manufacturer: "Test Manufacturer".into(),
            serial_number: "123456".into(),
            date_of_manufacture: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            warranty_information: None,
            category: "Test Category".into(),
        }
    }

    #[tokio::test]
    async fn test_register_persists_valid_product() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_exists_by_serial()
            .with(eq("123456"), eq(None))
            .returning(|_, _| Ok(false));
        mock_repo
            .expect_create()
            .withf(|input: &NewProduct| input.serial_number == "123456")
            .times(1)
            .returning(|input| Ok(Product::from_new(1, input)));

        let service = ProductService::new(mock_repo);
        let product = service.register_product(registration()).await.unwrap();

        assert_eq!(product.id, 1);
    }

    #[tokio::test]
    async fn test_register_invalid_payload_never_reaches_repository() {
        // no expectations: any repository call panics
        let service = ProductService::new(MockProductRepository::new());

        let input = RegisterProduct {
            date_of_manufacture: Some("2999-01-01".into()),
            ..registration()
        };

        match service.register_product(input).await {
            Err(ProductError::Registration(errors)) => assert_eq!(
                errors["date_of_manufacture"],
                vec!["Manufacture date cannot be in the future".to_string()]
            ),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_duplicate_serial_is_a_field_error() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_exists_by_serial()
            .returning(|_, _| Ok(true));

        let service = ProductService::new(mock_repo);

        match service.register_product(registration()).await {
            Err(ProductError::Registration(errors)) => {
                assert_eq!(errors["serial_number"], vec![DUPLICATE_SERIAL_MESSAGE.to_string()])
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_race_on_unique_index_is_a_field_error() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_exists_by_serial()
            .returning(|_, _| Ok(false));
        mock_repo
            .expect_create()
            .returning(|input| Err(ProductError::DuplicateSerial(input.serial_number)));

        let service = ProductService::new(mock_repo);
        let result = service.register_product(registration()).await;

        assert!(matches!(result, Err(ProductError::Registration(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_immutable_fields_without_writing() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(stored(id))));
        mock_repo.expect_update().never();

        let service = ProductService::new(mock_repo);
        let input = UpdateProduct {
            manufacturer: Some(Some("Test Manufacturer".into())),
            ..Default::default()
        };

        let result = service.update_product(1, input).await;
        assert!(matches!(result, Err(ProductError::ImmutableField)));
    }

    #[tokio::test]
    async fn test_update_field_errors_win_over_immutable_check() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(|id| Ok(Some(stored(id))));

        let service = ProductService::new(mock_repo);
        let input = UpdateProduct {
            manufacturer: Some(Some("m".repeat(101))),
            ..Default::default()
        };

        let result = service.update_product(1, input).await;
        assert!(matches!(result, Err(ProductError::InvalidUpdate(e)) if e.contains_key("manufacturer")));
    }

    #[tokio::test]
    async fn test_update_serial_taken_by_other_product() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(|id| Ok(Some(stored(id))));
        mock_repo
            .expect_exists_by_serial()
            .with(eq("999"), eq(Some(1)))
            .returning(|_, _| Ok(true));

        let service = ProductService::new(mock_repo);
        let input = UpdateProduct {
            serial_number: Some(Some("999".into())),
            ..Default::default()
        };

        match service.update_product(1, input).await {
            Err(ProductError::InvalidUpdate(errors)) => {
                assert_eq!(errors["serial_number"], vec![DUPLICATE_SERIAL_MESSAGE.to_string()])
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_null_manufacturer_is_field_error() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(|id| Ok(Some(stored(id))));
        mock_repo.expect_update().never();

        let service = ProductService::new(mock_repo);
        let input = UpdateProduct {
            manufacturer: Some(None),
            ..Default::default()
        };

        match service.update_product(1, input).await {
            Err(ProductError::InvalidUpdate(errors)) => assert_eq!(
                errors["manufacturer"],
                vec!["This field may not be null.".to_string()]
            ),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_get_by_id().returning(|_| Ok(None));

        let service = ProductService::new(mock_repo);
        let result = service.update_product(7, UpdateProduct::default()).await;

        assert!(matches!(result, Err(ProductError::NotFound(7))));
    }

    #[tokio::test]
    async fn test_list_out_of_range_page_is_invalid() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_count().with(always()).returning(|_| Ok(6));
        mock_repo.expect_list().never();

        let service = ProductService::new(mock_repo);
        let page = PageRequest {
            page: 3,
            page_size: 5,
        };

        let result = service
            .list_products(ProductFilter::default(), ProductOrdering::default(), page)
            .await;
        assert!(matches!(result, Err(ProductError::InvalidPage)));
    }

    #[tokio::test]
    async fn test_list_first_page_of_empty_listing() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_count().returning(|_| Ok(0));
        mock_repo
            .expect_list()
            .with(always(), eq(ProductOrdering::default()), eq(0), eq(5))
            .returning(|_, _, _, _| Ok(vec![]));

        let service = ProductService::new(mock_repo);
        let (count, products) = service
            .list_products(
                ProductFilter::default(),
                ProductOrdering::default(),
                PageRequest::default(),
            )
            .await
            .unwrap();

        assert_eq!(count, 0);
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_product() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_delete().with(eq(5)).returning(|_| Ok(false));

        let service = ProductService::new(mock_repo);
        assert!(matches!(
            service.delete_product(5).await,
            Err(ProductError::NotFound(5))
        ));
    }
}
