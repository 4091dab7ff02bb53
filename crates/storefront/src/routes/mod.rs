//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Catalog (?category=&q=)
//! GET  /admin                  - Admin dashboard
//! GET  /checkout               - Checkout form
//! POST /checkout               - Place order, redirect to /callback
//! GET  /callback               - Order confirmation (?order=)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart popup (?open=true|false)
//! POST /cart/add               - Add product snapshot (id, name, price, image_url)
//! POST /cart/update            - Change line quantity (index, delta)
//! POST /cart/remove            - Remove line (index)
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge
//!
//! # JSON API
//! GET    /api/products         - List products (?category=&q=)
//! POST   /api/products         - Create product (multipart, optional image)
//! GET    /api/products/{id}    - Get product
//! PUT    /api/products/{id}    - Update product
//! DELETE /api/products/{id}    - Delete product and its image
//! GET    /api/orders           - List orders
//! POST   /api/orders           - Create order
//! PUT    /api/orders/{id}      - Update order status
//! GET    /api/users            - List users
//! PUT    /api/users/{id}       - Update user
//! GET    /api/dashboard        - Summary stats
//! GET    /api/cart             - Session cart as JSON
//! ```

pub mod api;
pub mod cart;
mod extract;
pub mod pages;

use axum::{
    Router,
    routing::{get, post},
};

pub use extract::{AppForm, AppJson};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(pages::index))
        .route("/admin", get(pages::admin))
        .route(
            "/checkout",
            get(pages::checkout_page).post(pages::checkout_submit),
        )
        .route("/callback", get(pages::callback))
        .nest("/cart", cart_routes())
        .nest("/api", api::routes(max_upload_bytes))
}
