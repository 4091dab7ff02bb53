//! Request correlation ids.
//!
//! Every response carries an `x-request-id`. A value supplied by a proxy in
//! front of the storefront is reused; otherwise a UUID v4 is minted. The id
//! is recorded on the `http_request` span and tagged on the Sentry scope so
//! log lines and captured errors for one request can be matched up.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Ids longer than this are replaced rather than trusted.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Attach a request id to the span, the Sentry scope and the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = incoming_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn incoming_id(request: &Request) -> Option<String> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(String::from)
}
