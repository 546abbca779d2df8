use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

use crate::models::{Product, ProductImage};

/// Sea-ORM Entity for the products table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub brand: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    pub category: String,
    pub release_date: Date,
    pub product_available: bool,
    pub stock_quantity: i32,
    pub image_name: Option<String>,
    pub image_type: Option<String>,
    pub image_data: Option<Vec<u8>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        // A row only has an image when all three columns are filled
        let image = match (model.image_name, model.image_type, model.image_data) {
            (Some(name), Some(content_type), Some(data)) => Some(ProductImage {
                name,
                content_type,
                data,
            }),
            _ => None,
        };

        Self {
            id: Some(model.id),
            name: model.name,
            description: model.description,
            brand: model.brand,
            price: model.price,
            category: model.category,
            release_date: model.release_date,
            product_available: model.product_available,
            stock_quantity: model.stock_quantity,
            image,
        }
    }
}

impl From<Product> for ActiveModel {
    fn from(product: Product) -> Self {
        let (image_name, image_type, image_data) = match product.image {
            Some(image) => (Some(image.name), Some(image.content_type), Some(image.data)),
            None => (None, None, None),
        };

        ActiveModel {
            id: product.id.map_or(NotSet, Set),
            name: Set(product.name),
            description: Set(product.description),
            brand: Set(product.brand),
            price: Set(product.price),
            category: Set(product.category),
            release_date: Set(product.release_date),
            product_available: Set(product.product_available),
            stock_quantity: Set(product.stock_quantity),
            image_name: Set(image_name),
            image_type: Set(image_type),
            image_data: Set(image_data),
        }
    }
}
