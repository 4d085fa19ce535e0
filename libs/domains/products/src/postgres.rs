use async_trait::async_trait;
use database::postgres::is_unique_violation;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};

use crate::{
    entity,
    error::{ProductError, ProductResult},
    models::{NewProduct, Product, ProductChanges, ProductField, ProductFilter, ProductOrdering},
    repository::ProductRepository,
};

/// Escapes LIKE wildcards so user input only ever matches literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// `LOWER(column) LIKE '%needle%'`
fn icontains(column: &str, needle: &str) -> Condition {
    Condition::all().add(Expr::cust_with_values(
        format!("LOWER(\"{}\") LIKE $1 ESCAPE '\\'", column),
        [like_pattern(needle)],
    ))
}

fn apply_filter(filter: &ProductFilter) -> Select<entity::Entity> {
    let mut query = entity::Entity::find();

    if let Some(ref name) = filter.name {
        query = query.filter(icontains("name", name));
    }

    if let Some(ref manufacturer) = filter.manufacturer {
        query = query.filter(icontains("manufacturer", manufacturer));
    }

    if let Some(ref category) = filter.category {
        query = query.filter(icontains("category", category));
    }

    for term in filter.search_terms() {
        query = query.filter(
            Condition::any()
                .add(icontains("name", term))
                .add(icontains("manufacturer", term))
                .add(icontains("category", term)),
        );
    }

    query
}

fn column(field: ProductField) -> entity::Column {
    match field {
        ProductField::Id => entity::Column::Id,
        ProductField::Name => entity::Column::Name,
        ProductField::Description => entity::Column::Description,
        ProductField::Manufacturer => entity::Column::Manufacturer,
        ProductField::SerialNumber => entity::Column::SerialNumber,
        ProductField::DateOfManufacture => entity::Column::DateOfManufacture,
        ProductField::WarrantyInformation => entity::Column::WarrantyInformation,
        ProductField::Category => entity::Column::Category,
    }
}

/// Requested sort keys, then id so pages stay stable.
fn apply_ordering(
    mut query: Select<entity::Entity>,
    ordering: &ProductOrdering,
) -> Select<entity::Entity> {
    for key in ordering.keys() {
        let order = if key.descending { Order::Desc } else { Order::Asc };
        query = query.order_by(column(key.field), order);
    }
    query.order_by_asc(entity::Column::Id)
}

/// Unique index violations on `serial_number` become `DuplicateSerial`.
fn map_write_error(err: DbErr, serial_number: Option<&str>) -> ProductError {
    match serial_number {
        Some(serial) if is_unique_violation(&err) => {
            ProductError::DuplicateSerial(serial.to_string())
        }
        _ => ProductError::Database(err),
    }
}

pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let serial_number = input.serial_number.clone();
        let active_model: entity::ActiveModel = input.into();

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_error(e, Some(&serial_number)))?;

        tracing::info!(product_id = model.id, "Created product");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list(
        &self,
        filter: &ProductFilter,
        ordering: &ProductOrdering,
        offset: u64,
        limit: u64,
    ) -> ProductResult<Vec<Product>> {
        let models = apply_ordering(apply_filter(filter), ordering)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count(&self, filter: &ProductFilter) -> ProductResult<u64> {
        Ok(apply_filter(filter).count(&self.db).await?)
    }

    async fn update(&self, id: i32, changes: ProductChanges) -> ProductResult<Product> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        if changes.is_empty() {
            return Ok(model.into());
        }

        let serial_number = changes.serial_number.clone();
        let mut active_model: entity::ActiveModel = model.into();

        if let Some(name) = changes.name {
            active_model.name = Set(name);
        }
        if let Some(description) = changes.description {
            active_model.description = Set(description);
        }
        if let Some(serial) = changes.serial_number {
            active_model.serial_number = Set(serial);
        }
        if let Some(warranty) = changes.warranty_information {
            active_model.warranty_information = Set(warranty);
        }
        if let Some(category) = changes.category {
            active_model.category = Set(category);
        }

        let updated = active_model
            .update(&self.db)
            .await
            .map_err(|e| map_write_error(e, serial_number.as_deref()))?;

        tracing::info!(product_id = id, "Updated product");
        Ok(updated.into())
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
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
        let mut query =
            entity::Entity::find().filter(entity::Column::SerialNumber.eq(serial_number));

        if let Some(id) = exclude {
            query = query.filter(entity::Column::Id.ne(id));
        }

        Ok(query.count(&self.db).await? > 0)
    }
}
