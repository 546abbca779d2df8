//! Handler tests for the products router, driven through `oneshot` against
//! the in-memory store.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use domain_products::{
    InMemoryProductRepository, Product, ProductError, ProductRepository, ProductResult,
    ProductService, StockTransaction, handlers,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use test_utils::assertions::assert_error_body;
use tower::ServiceExt;

const BOUNDARY: &str = "catalog-test-boundary";

fn app() -> Router {
    handlers::router(ProductService::new(InMemoryProductRepository::new()))
}

fn product_json(name: &str, stock: i32) -> Value {
    json!({
        "name": name,
        "description": "A test product",
        "brand": "Acme",
        "price": "19.99",
        "category": "Gadgets",
        "release_date": "2024-05-17",
        "product_available": true,
        "stock_quantity": stock
    })
}

fn multipart_body(product: Option<&Value>, image: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(product) = product {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"product\"\r\nContent-Type: application/json\r\n\r\n{product}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"imageFile\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(method: Method, uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Raw JSON text, so the client's key order reaches the server untouched.
fn raw_json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, name: &str, stock: i32) -> Value {
    let product = product_json(name, stock);
    let (status, body) = send_json(
        app,
        multipart_request(Method::POST, "/", multipart_body(Some(&product), None)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn test_list_empty_catalog() {
    let app = app();

    let (status, body) = send_json(&app, empty_request(Method::GET, "/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_create_and_get() {
    let app = app();

    let created = create(&app, "Desk Lamp", 5).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["price"], "19.99");
    assert!(created.get("image").is_none());

    let (status, fetched) = send_json(&app, empty_request(Method::GET, "/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_list_returns_ascending_ids() {
    let app = app();
    create(&app, "B", 1).await;
    create(&app, "A", 1).await;

    let (_, body) = send_json(&app, empty_request(Method::GET, "/")).await;

    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_create_with_image_and_download() {
    let app = app();
    let product = product_json("Camera", 2);
    let image = vec![0x89, b'P', b'N', b'G', 1, 2, 3, 4];

    let (status, created) = send_json(
        &app,
        multipart_request(
            Method::POST,
            "/",
            multipart_body(Some(&product), Some(("camera.png", "image/png", &image))),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["image"]["name"], "camera.png");
    assert_eq!(created["image"]["content_type"], "image/png");

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/1/image"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.to_vec(), image);
}

#[tokio::test]
async fn test_create_with_empty_image_part_has_no_image() {
    let app = app();
    let product = product_json("Camera", 2);

    let (status, created) = send_json(
        &app,
        multipart_request(
            Method::POST,
            "/",
            multipart_body(Some(&product), Some(("empty.png", "image/png", &[]))),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(created.get("image").is_none());
}

#[tokio::test]
async fn test_create_without_product_part() {
    let app = app();

    let (status, body) = send(
        &app,
        multipart_request(Method::POST, "/", multipart_body(None, None)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, "INVALID_REQUEST", "missing `product` part");
}

#[tokio::test]
async fn test_create_with_malformed_product_json() {
    let app = app();
    let broken = json!("not an object");

    let (status, body) = send(
        &app,
        multipart_request(Method::POST, "/", multipart_body(Some(&broken), None)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, "INVALID_REQUEST", "`product` part");
}

#[tokio::test]
async fn test_create_rejects_invalid_fields() {
    let app = app();
    let mut product = product_json("", 1);
    product["stock_quantity"] = json!(-3);

    let (status, body) = send(
        &app,
        multipart_request(Method::POST, "/", multipart_body(Some(&product), None)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, "INVALID_REQUEST", "Invalid request");
}

#[tokio::test]
async fn test_create_requires_multipart() {
    let app = app();

    let (status, body) = send(&app, json_request(Method::POST, "/", product_json("X", 1))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, "INVALID_MULTIPART", "");
}

#[tokio::test]
async fn test_get_missing_product() {
    let app = app();

    let (status, body) = send_json(&app, empty_request(Method::GET, "/42")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1004);
    assert_eq!(body["error"], "NOT_FOUND");
    assert_eq!(body["message"], "Product not found with id: 42");
}

#[tokio::test]
async fn test_get_non_numeric_id() {
    let app = app();

    let (status, body) = send_json(&app, empty_request(Method::GET, "/abc")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ID");
}

#[tokio::test]
async fn test_update_overwrites_and_keeps_image() {
    let app = app();
    let product = product_json("Camera", 2);
    send(
        &app,
        multipart_request(
            Method::POST,
            "/",
            multipart_body(Some(&product), Some(("camera.png", "image/png", b"pixels"))),
        ),
    )
    .await;

    let mut replacement = product_json("Camera II", 9);
    replacement["brand"] = json!("");
    replacement["price"] = json!("249.00");
    replacement["product_available"] = json!(false);
    let (status, updated) = send_json(
        &app,
        multipart_request(Method::PUT, "/1", multipart_body(Some(&replacement), None)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["name"], "Camera II");
    assert_eq!(updated["brand"], "");
    assert_eq!(updated["price"], "249.00");
    assert_eq!(updated["stock_quantity"], 9);
    assert_eq!(updated["product_available"], false);
    assert_eq!(updated["image"]["name"], "camera.png");

    let (status, bytes) = send(&app, empty_request(Method::GET, "/1/image")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"pixels");
}

#[tokio::test]
async fn test_update_missing_product() {
    let app = app();
    let product = product_json("Ghost", 1);

    let (status, body) = send_json(
        &app,
        multipart_request(Method::PUT, "/7", multipart_body(Some(&product), None)),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found with id: 7");
}

#[tokio::test]
async fn test_update_missing_product_with_invalid_fields() {
    let app = app();
    let product = product_json("", 1);

    let (status, body) = send_json(
        &app,
        multipart_request(Method::PUT, "/999", multipart_body(Some(&product), None)),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found with id: 999");
}

#[tokio::test]
async fn test_create_rejects_non_image_upload() {
    let app = app();
    let product = product_json("Poster", 1);

    let (status, body) = send_json(
        &app,
        multipart_request(
            Method::POST,
            "/",
            multipart_body(
                Some(&product),
                Some(("poster.html", "text/html", b"<script>alert(1)</script>")),
            ),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_REQUEST");

    let (_, list) = send_json(&app, empty_request(Method::GET, "/")).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_create_oversized_upload_is_payload_too_large() {
    let app = app();
    let product = product_json("Huge", 1);
    let image = vec![0u8; 10 * 1024 * 1024 + 1];

    let (status, body) = send_json(
        &app,
        multipart_request(
            Method::POST,
            "/",
            multipart_body(Some(&product), Some(("huge.png", "image/png", &image))),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "INVALID_MULTIPART");
}

#[tokio::test]
async fn test_delete_then_get() {
    let app = app();
    create(&app, "Chair", 1).await;

    let (status, body) = send(&app, empty_request(Method::DELETE, "/1")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, _) = send(&app, empty_request(Method::GET, "/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, empty_request(Method::DELETE, "/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_image_missing() {
    let app = app();
    create(&app, "Chair", 1).await;

    let (status, body) = send_json(&app, empty_request(Method::GET, "/1/image")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Image not found for product id: 1");
}

#[tokio::test]
async fn test_checkout_decrements_stock() {
    let app = app();
    create(&app, "A", 5).await;
    create(&app, "B", 3).await;

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/checkout", json!({"1": 3, "2": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, a) = send_json(&app, empty_request(Method::GET, "/1")).await;
    let (_, b) = send_json(&app, empty_request(Method::GET, "/2")).await;
    assert_eq!(a["stock_quantity"], 2);
    assert_eq!(b["stock_quantity"], 0);
}

#[tokio::test]
async fn test_checkout_out_of_stock_is_all_or_nothing() {
    let app = app();
    create(&app, "A", 5).await;
    create(&app, "B", 1).await;

    let (status, body) = send_json(
        &app,
        json_request(Method::POST, "/checkout", json!({"1": 2, "2": 100})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_REQUEST");
    assert_eq!(body["message"], "Product B is out of stock.");

    let (_, a) = send_json(&app, empty_request(Method::GET, "/1")).await;
    assert_eq!(a["stock_quantity"], 5);
}

#[tokio::test]
async fn test_checkout_reports_first_failure_in_client_order() {
    let app = app();
    create(&app, "A", 1).await;

    let (status, body) = send_json(
        &app,
        raw_json_request(Method::POST, "/checkout", r#"{"1": 100, "0": 1}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Product A is out of stock.");
}

#[tokio::test]
async fn test_checkout_unknown_product() {
    let app = app();

    let (status, body) = send_json(
        &app,
        json_request(Method::POST, "/checkout", json!({"99": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found with id: 99");
}

#[tokio::test]
async fn test_checkout_malformed_body() {
    let app = app();

    let (status, body) = send_json(
        &app,
        json_request(Method::POST, "/checkout", json!({"one": "two"})),
    )
    .await;

    assert!(status.is_client_error());
    assert_eq!(body["error"], "INVALID_JSON");
}

/// Store whose every operation fails.
struct BrokenRepository;

#[async_trait]
impl ProductRepository for BrokenRepository {
    async fn find_by_id(&self, _id: i32) -> ProductResult<Option<Product>> {
        Err(ProductError::Database("connection reset".into()))
    }

    async fn find_all(&self) -> ProductResult<Vec<Product>> {
        Err(ProductError::Database("connection reset".into()))
    }

    async fn save(&self, _product: Product) -> ProductResult<Product> {
        Err(ProductError::Database("connection reset".into()))
    }

    async fn delete(&self, _product: Product) -> ProductResult<()> {
        Err(ProductError::Database("connection reset".into()))
    }

    async fn begin(&self) -> ProductResult<Box<dyn StockTransaction>> {
        Err(ProductError::Database("connection reset".into()))
    }
}

#[tokio::test]
async fn test_unclassified_failure_is_reported_as_unexpected() {
    let app = handlers::router(ProductService::new(BrokenRepository));

    let (status, body) = send_json(&app, empty_request(Method::GET, "/")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "UNEXPECTED_ERROR");
    assert_eq!(
        body["message"],
        "An unexpected error occurred: Database error: connection reset"
    );
}

#[tokio::test]
async fn test_creation_failure_keeps_its_message() {
    let app = handlers::router(ProductService::new(BrokenRepository));
    let product = product_json("Lamp", 1);

    let (status, body) = send_json(
        &app,
        multipart_request(Method::POST, "/", multipart_body(Some(&product), None)),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "INTERNAL_ERROR");
    assert_eq!(
        body["message"],
        "Failed to create product: Database error: connection reset"
    );
}
