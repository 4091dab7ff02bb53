//! End-to-end tests against a running storefront.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`kedai-cli migrate`)
//! - The storefront running (`cargo run -p kedai-storefront`)
//!
//! Run with: `cargo test -p kedai-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the storefront (configurable via environment).
fn base_url() -> String {
    std::env::var("KEDAI_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A client that keeps the session cookie, like a browser.
fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Test helper: create a product and return its JSON.
async fn create_product(client: &Client, name: &str, price: &str) -> Value {
    let form = Form::new()
        .text("name", name.to_string())
        .text("description", "Created by the end-to-end tests")
        .text("price", price.to_string())
        .text("stock", "10")
        .text("category", "test")
        .part(
            "image",
            Part::bytes(b"\x89PNG\r\n\x1a\n".to_vec())
                .file_name("tiny.png")
                .mime_str("image/png")
                .unwrap(),
        );

    let resp = client
        .post(format!("{}/api/products", base_url()))
        .multipart(form)
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.unwrap();
    body["product"].clone()
}

async fn delete_product(client: &Client, id: &Value) {
    let _ = client
        .delete(format!("{}/api/products/{id}", base_url()))
        .send()
        .await;
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_product_lifecycle() {
    let client = browser();
    let name = format!("Kopi-{}", Uuid::new_v4());
    let product = create_product(&client, &name, "45000").await;
    let id = product["id"].clone();

    assert_eq!(product["price"], "45000");
    let image_url = product["imageUrl"].as_str().unwrap().to_string();
    assert!(image_url.starts_with("/uploads/"));

    let image = client
        .get(format!("{}{image_url}", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(image.status(), StatusCode::OK);

    let found: Vec<Value> = client
        .get(format!("{}/api/products?q={name}&category=test", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    let resp = client
        .put(format!("{}/api/products/{id}", base_url()))
        .json(&json!({ "price": "50000", "stock": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["product"]["price"], "50000");
    assert_eq!(body["product"]["name"], name.as_str());

    let resp = client
        .delete(format!("{}/api/products/{id}", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/api/products/{id}", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let image = client
        .get(format!("{}{image_url}", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(image.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_checkout_places_order_and_clears_cart() {
    let client = browser();
    let product = create_product(&client, &format!("Batik {}", Uuid::new_v4()), "125000").await;
    let id = product["id"].to_string();
    let name = product["name"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let resp = client
            .post(format!("{}/cart/add", base_url()))
            .form(&[("id", id.as_str()), ("name", name.as_str()), ("price", "125000")])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = client
        .post(format!("{}/checkout", base_url()))
        .form(&[
            ("name", "Siti Rahma"),
            ("email", "siti@example.com"),
            ("phone", "0812345678"),
            ("address", "Jl. Merdeka 1, Bandung"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let confirmation = resp.url().to_string();
    assert!(confirmation.contains("/callback?order=ORD-"));
    let order_number = confirmation.rsplit('=').next().unwrap().to_string();

    let cart: Value = client
        .get(format!("{}/api/cart", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["itemCount"], 0);

    let orders: Vec<Value> = client
        .get(format!("{}/api/orders", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let order = orders
        .iter()
        .find(|order| order["orderNumber"] == order_number.as_str())
        .expect("placed order is listed");
    assert_eq!(order["totalAmount"], "250000");
    assert_eq!(order["status"], "pending");
    assert_eq!(order["items"][0]["quantity"], 2);
    assert_eq!(order["items"][0]["product"]["name"], name.as_str());

    delete_product(&client, &product["id"]).await;
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_order_api_and_revenue() {
    let client = browser();

    let before: Value = client
        .get(format!("{}/api/dashboard", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let resp = client
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({
            "customer": {
                "name": "Budi",
                "email": "budi@example.com",
                "address": "Jl. Sudirman 5",
            },
            "items": [
                { "productId": 999_999, "name": "Gone", "price": "10000", "quantity": 2 },
                { "productId": 999_998, "name": "Also gone", "price": "5000", "quantity": 1 },
            ],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["order"]["totalAmount"], "25000");
    assert!(body["order"]["items"][0]["product"].is_null());
    let id = body["order"]["id"].clone();

    let resp = client
        .put(format!("{}/api/orders/{id}", base_url()))
        .json(&json!({ "paymentStatus": "paid", "status": "processing" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let after: Value = client
        .get(format!("{}/api/dashboard", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        after["totalOrders"].as_i64().unwrap(),
        before["totalOrders"].as_i64().unwrap() + 1
    );
    assert_ne!(after["totalRevenue"], before["totalRevenue"]);

    let resp = client
        .put(format!("{}/api/orders/2147483647", base_url()))
        .json(&json!({ "status": "shipped" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
