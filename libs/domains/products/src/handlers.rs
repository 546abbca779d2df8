//! HTTP handlers for Products API

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AppError, IdPath,
    errors::responses::{
        BadRequestIdResponse, BadRequestResponse, InternalServerErrorResponse, NotFoundResponse,
    },
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::ProductError;
use crate::models::{CheckoutRequest, ImageUpload, Product, ProductImage, ProductInput};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// Multipart part carrying the JSON-encoded [`ProductInput`]
pub const PRODUCT_PART: &str = "product";
/// Optional multipart part carrying the image file
pub const IMAGE_PART: &str = "imageFile";

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
        get_product_image,
        checkout,
    ),
    components(
        schemas(Product, ProductInput, ProductImage, ProductForm),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestIdResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalog and checkout endpoints")
    )
)]
pub struct ApiDoc;

/// Multipart form accepted by create and update
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    /// JSON-encoded product fields
    pub product: ProductInput,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image_file: Option<Vec<u8>>,
}

/// Create the products router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/checkout", post(checkout))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/image", get(get_product_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(shared_service)
}

/// List every product, ascending id
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    responses(
        (status = 200, description = "List of products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = service.get_all().await?;
    Ok(Json(products))
}

/// Create a product, optionally with an image
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body(content = ProductForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, response = BadRequestResponse),
        (status = 413, description = "Upload larger than 10 MiB"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let (input, image) = read_product_form(multipart?).await?;
    let product = service.create(input, image).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> Result<Json<Product>, AppError> {
    let product = service.get_by_id(id).await?;
    Ok(Json(product))
}

/// Replace every field of a product; the image changes only if one is sent
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    request_body(content = ProductForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 413, description = "Upload larger than 10 MiB"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Product>, AppError> {
    let (input, image) = read_product_form(multipart?).await?;
    let product = service.update(id, input, image).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> Result<StatusCode, AppError> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Download a product's image
#[utoipa::path(
    get,
    path = "/{id}/image",
    tag = "Products",
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Raw image bytes with the stored content type"),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product_image<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let (image, bytes) = service.get_image(id).await?;
    Ok(([(header::CONTENT_TYPE, image.content_type)], bytes))
}

/// Decrement stock for several products at once, all or nothing
#[utoipa::path(
    post,
    path = "/checkout",
    tag = "Products",
    request_body(content = std::collections::HashMap<String, i32>, description = "Product id to quantity"),
    responses(
        (status = 204, description = "Stock decremented for every product"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn checkout<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(request) = payload?;
    service.checkout(request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Pull the `product` JSON part and the optional image part out of a form.
///
/// Unknown parts are skipped. Multipart read failures keep their own status,
/// so an oversized upload answers 413.
async fn read_product_form(
    mut multipart: Multipart,
) -> Result<(ProductInput, Option<ImageUpload>), AppError> {
    let mut input = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some(PRODUCT_PART) => {
                let text = field.text().await?;
                let parsed = serde_json::from_str(&text).map_err(|e| {
                    ProductError::InvalidRequest(format!("`{PRODUCT_PART}` part: {e}"))
                })?;
                input = Some(parsed);
            }
            Some(IMAGE_PART) => image = Some(read_image(field).await?),
            _ => {}
        }
    }

    let input = input.ok_or_else(|| {
        ProductError::InvalidRequest(format!("missing `{PRODUCT_PART}` part"))
    })?;
    Ok((input, image))
}

async fn read_image(field: Field<'_>) -> Result<ImageUpload, MultipartError> {
    let name = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await?;

    Ok(ImageUpload {
        name,
        content_type,
        bytes: bytes.to_vec(),
    })
}

