use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{NewProduct, Product};

/// Sea-ORM Entity for the products table
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub manufacturer: String,
    #[sea_orm(unique)]
    pub serial_number: String,
    pub date_of_manufacture: Date,
    pub warranty_information: Option<String>,
    pub category: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            manufacturer: model.manufacturer,
            serial_number: model.serial_number,
            date_of_manufacture: model.date_of_manufacture,
            warranty_information: model.warranty_information,
            category: model.category,
        }
    }
}

// id is assigned by the database sequence
impl From<NewProduct> for ActiveModel {
    fn from(input: NewProduct) -> Self {
        ActiveModel {
            id: NotSet,
            name: Set(input.name),
            description: Set(input.description),
            manufacturer: Set(input.manufacturer),
            serial_number: Set(input.serial_number),
            date_of_manufacture: Set(input.date_of_manufacture),
            warranty_information: Set(input.warranty_information),
            category: Set(input.category),
        }
    }
}
