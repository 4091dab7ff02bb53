//! Kedai Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused. [`app`] assembles the full router;
//! the binary only adds Sentry, the `PostgreSQL` session store and a listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use std::time::Duration;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    response::Response,
    routing::get,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionStore;
use tracing::Span;

use crate::services::uploads::PUBLIC_PREFIX;
use crate::state::AppState;

/// Build the storefront router.
///
/// `session_store` backs the per-browser session (and so the cart).
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = middleware::create_session_layer(session_store, state.config());
    let uploads = ServeDir::new(state.images().dir());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes(state.config().max_upload_bytes))
        .nest_service(PUBLIC_PREFIX, uploads)
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    tracing::debug!("response sent");
                }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
