//! JSON API consumed by the storefront and admin pages.
//!
//! Every failure renders as `{"error": "<message>"}` via
//! [`AppError`](crate::error::AppError).

pub mod dashboard;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, put},
};

use crate::state::AppState;

/// Room for multipart boundaries and text fields on top of the image itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the API routes router.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(products::list)
                .post(products::create)
                .layer(DefaultBodyLimit::max(
                    max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
                )),
        )
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/orders", get(orders::list).post(orders::create))
        .route("/orders/{id}", put(orders::update))
        .route("/users", get(users::list))
        .route("/users/{id}", put(users::update))
        .route("/dashboard", get(dashboard::stats))
        .route("/cart", get(super::cart::json))
}
