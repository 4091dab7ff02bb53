//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, one hub per request)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions; holds each browser's cart)

pub mod request_id;
pub mod session;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::create_session_layer;
