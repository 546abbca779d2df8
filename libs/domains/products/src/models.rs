use chrono::NaiveDate;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Image attached to a product.
///
/// `data` holds the zlib-compressed bytes and never leaves the service as
/// JSON; clients fetch the decompressed image from `/products/{id}/image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    /// Original file name
    pub name: String,
    /// MIME type, e.g. `image/png`
    pub content_type: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Assigned by the store; `None` until first saved
    pub id: Option<i32>,
    pub name: String,
    pub description: String,
    pub brand: String,
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    pub category: String,
    pub release_date: NaiveDate,
    pub product_available: bool,
    pub stock_quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ProductImage>,
}

impl Product {
    /// New, unsaved product without an image.
    pub fn from_input(input: ProductInput) -> Self {
        Self {
            id: None,
            name: input.name,
            description: input.description,
            brand: input.brand,
            price: input.price,
            category: input.category,
            release_date: input.release_date,
            product_available: input.product_available,
            stock_quantity: input.stock_quantity,
            image: None,
        }
    }

    /// Overwrite every mutable scalar field. Identity and image are untouched.
    pub fn apply_input(&mut self, input: ProductInput) {
        self.name = input.name;
        self.description = input.description;
        self.brand = input.brand;
        self.price = input.price;
        self.category = input.category;
        self.release_date = input.release_date;
        self.product_available = input.product_available;
        self.stock_quantity = input.stock_quantity;
    }
}

/// DTO for creating or fully replacing a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub brand: String,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub category: String,
    pub release_date: NaiveDate,
    #[serde(default)]
    pub product_available: bool,
    #[validate(range(min = 0))]
    pub stock_quantity: i32,
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        return Err(ValidationError::new("negative_price"));
    }
    Ok(())
}

/// Raw image as uploaded, before compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// A zero-byte upload counts as no image at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Product id to requested quantity, iterated in the order the client sent.
pub type CheckoutRequest = IndexMap<i32, i32>;
