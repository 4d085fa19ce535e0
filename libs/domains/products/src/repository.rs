use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product, ProductChanges, ProductFilter, ProductOrdering};

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product; fails with `DuplicateSerial` if the serial number is taken
    async fn create(&self, input: NewProduct) -> ProductResult<Product>;

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>>;

    /// Products matching `filter`, sorted by `ordering` with id as the final key
    async fn list(
        &self,
        filter: &ProductFilter,
        ordering: &ProductOrdering,
        offset: u64,
        limit: u64,
    ) -> ProductResult<Vec<Product>>;

    /// Number of products matching `filter`
    async fn count(&self, filter: &ProductFilter) -> ProductResult<u64>;

    /// Apply changes to an existing product
    async fn update(&self, id: i32, changes: ProductChanges) -> ProductResult<Product>;

    /// Delete a product by ID, returning whether it existed
    async fn delete(&self, id: i32) -> ProductResult<bool>;

    /// Whether a product other than `exclude` uses `serial_number`
    async fn exists_by_serial(&self, serial_number: &str, exclude: Option<i32>)
    -> ProductResult<bool>;
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl ProductFilter {
    /// In-memory evaluation of the filter, mirroring the SQL one.
    pub fn matches(&self, product: &Product) -> bool {
        let field_matches = |filter: &Option<String>, value: &str| {
            filter.as_deref().is_none_or(|needle| contains_ci(value, needle))
        };

        field_matches(&self.name, &product.name)
            && field_matches(&self.manufacturer, &product.manufacturer)
            && field_matches(&self.category, &product.category)
            && self.search_terms().iter().all(|term| {
                contains_ci(&product.name, term)
                    || contains_ci(&product.manufacturer, term)
                    || contains_ci(&product.category, term)
            })
    }
}

#[derive(Debug, Default)]
struct Store {
    last_id: i32,
    products: BTreeMap<i32, Product>,
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let mut store = self.store.write().await;

        if store
            .products
            .values()
            .any(|p| p.serial_number == input.serial_number)
        {
            return Err(ProductError::DuplicateSerial(input.serial_number));
        }

        store.last_id += 1;
        let product = Product::from_new(store.last_id, input);
        store.products.insert(product.id, product.clone());

        tracing::info!(product_id = product.id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let store = self.store.read().await;
        Ok(store.products.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &ProductFilter,
        ordering: &ProductOrdering,
        offset: u64,
        limit: u64,
    ) -> ProductResult<Vec<Product>> {
        let store = self.store.read().await;

        let mut matching: Vec<&Product> =
            store.products.values().filter(|p| filter.matches(p)).collect();
        matching.sort_by(|a, b| ordering.compare(a, b));

        Ok(matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &ProductFilter) -> ProductResult<u64> {
        let store = self.store.read().await;
        Ok(store.products.values().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn update(&self, id: i32, changes: ProductChanges) -> ProductResult<Product> {
        let mut store = self.store.write().await;

        if let Some(ref serial) = changes.serial_number {
            if store
                .products
                .values()
                .any(|p| p.id != id && &p.serial_number == serial)
            {
                return Err(ProductError::DuplicateSerial(serial.clone()));
            }
        }

        let product = store
            .products
            .get_mut(&id)
            .ok_or(ProductError::NotFound(id))?;
        product.apply_changes(changes);

        tracing::info!(product_id = id, "Updated product");
        Ok(product.clone())
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let mut store = self.store.write().await;

        if store.products.remove(&id).is_some() {
            tracing::info!(product_id = id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn exists_by_serial(
        &self,
        serial_number: &str,
        exclude: Option<i32>,
    ) -> ProductResult<bool> {
        let store = self.store.read().await;
        Ok(store
            .products
            .values()
            .any(|p| p.serial_number == serial_number && Some(p.id) != exclude))
    }
}
