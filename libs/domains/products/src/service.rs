use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::image;
use crate::models::{CheckoutRequest, ImageUpload, Product, ProductImage, ProductInput};
use crate::repository::{ProductRepository, StockTransaction};

/// Service layer for Product business logic
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self) -> ProductResult<Vec<Product>> {
        info!("Fetching all products");
        self.repository.find_all().await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i32) -> ProductResult<Product> {
        info!("Fetching product");
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Create a product, compressing and attaching `image` when it has bytes.
    ///
    /// Any failure while building or persisting the record surfaces as
    /// [`ProductError::CreationFailed`].
    #[instrument(skip(self, input, image), fields(name = %input.name))]
    pub async fn create(
        &self,
        input: ProductInput,
        image: Option<ImageUpload>,
    ) -> ProductResult<Product> {
        info!("Creating product");
        validate(&input)?;
        let image = accepted_image(image)?;

        let build_and_save = async {
            let mut product = Product::from_input(input);
            if let Some(upload) = image {
                product.image = Some(compress_upload(upload)?);
            }
            self.repository.save(product).await
        };

        build_and_save
            .await
            .map_err(|e| ProductError::CreationFailed(e.to_string()))
    }

    /// Replace every scalar field of product `id`.
    ///
    /// The stored image is replaced only when a non-empty `image` is given.
    #[instrument(skip(self, input, image))]
    pub async fn update(
        &self,
        id: i32,
        input: ProductInput,
        image: Option<ImageUpload>,
    ) -> ProductResult<Product> {
        info!("Updating product");
        let mut product = self.get_by_id(id).await?;
        validate(&input)?;
        let image = accepted_image(image)?;

        product.apply_input(input);
        if let Some(upload) = image {
            product.image = Some(compress_upload(upload)?);
        }

        self.repository
            .save(product)
            .await
            .map_err(|e| ProductError::UpdateFailed(e.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> ProductResult<()> {
        info!("Deleting product");
        let product = self.get_by_id(id).await?;
        self.repository.delete(product).await
    }

    /// Decrement stock for every entry, or for none of them.
    ///
    /// Rows are locked in ascending id order, then entries are checked in
    /// the order the client sent them. The first missing or understocked
    /// product aborts the whole checkout.
    #[instrument(skip(self))]
    pub async fn checkout(&self, request: CheckoutRequest) -> ProductResult<()> {
        info!("Performing checkout");
        validate_checkout(&request)?;

        let mut tx = self.repository.begin().await?;
        match apply_checkout(tx.as_mut(), &request).await {
            Ok(()) => tx.commit().await,
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Checkout rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Image metadata and the decompressed bytes.
    #[instrument(skip(self))]
    pub async fn get_image(&self, id: i32) -> ProductResult<(ProductImage, Vec<u8>)> {
        info!("Fetching product image");
        let product = self.get_by_id(id).await?;
        let image = product.image.ok_or(ProductError::ImageNotFound(id))?;
        let bytes = image::decompress(&image.data)?;
        Ok((image, bytes))
    }
}

fn validate(input: &ProductInput) -> ProductResult<()> {
    input
        .validate()
        .map_err(|e| ProductError::InvalidRequest(e.to_string()))
}

fn validate_checkout(request: &CheckoutRequest) -> ProductResult<()> {
    if request.is_empty() {
        return Err(ProductError::InvalidRequest(
            "checkout requires at least one product".to_string(),
        ));
    }
    if let Some((id, quantity)) = request.iter().find(|(_, quantity)| **quantity < 1) {
        return Err(ProductError::InvalidRequest(format!(
            "quantity for product {id} must be at least 1, got {quantity}"
        )));
    }
    Ok(())
}

async fn apply_checkout(
    tx: &mut dyn StockTransaction,
    request: &CheckoutRequest,
) -> ProductResult<()> {
    let mut ids: Vec<i32> = request.keys().copied().collect();
    ids.sort_unstable();

    let mut locked = HashMap::with_capacity(ids.len());
    for id in ids {
        locked.insert(id, tx.find_for_update(id).await?);
    }

    for (&id, &quantity) in request {
        let mut product = locked
            .remove(&id)
            .flatten()
            .ok_or(ProductError::NotFound(id))?;

        if product.stock_quantity < quantity {
            return Err(ProductError::InsufficientStock(product.name));
        }

        product.stock_quantity -= quantity;
        let remaining = product.stock_quantity;
        tx.save(product).await?;
        debug!(product_id = id, quantity, remaining, "Stock decremented");
    }
    Ok(())
}

/// Drops empty uploads and rejects anything not declared as an image.
fn accepted_image(image: Option<ImageUpload>) -> ProductResult<Option<ImageUpload>> {
    match image.filter(|upload| !upload.is_empty()) {
        Some(upload) if !upload.content_type.starts_with("image/") => {
            Err(ProductError::InvalidRequest(format!(
                "image content type must be image/*, got {}",
                upload.content_type
            )))
        }
        other => Ok(other),
    }
}

fn compress_upload(upload: ImageUpload) -> ProductResult<ProductImage> {
    Ok(ProductImage {
        data: image::compress(&upload.bytes)?,
        name: upload.name,
        content_type: upload.content_type,
    })
}
