//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error renders as `{"error": "<message>"}`. Server-side failures get a
//! generic message; details only go to the logs and Sentry.

use axum::{
    Json,
    extract::multipart::MultipartError,
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::ValidationError;
use crate::services::{CartStoreError, CheckoutError, UploadError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Image upload was rejected or could not be stored.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Order could not be placed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Cart could not be written back to the session.
    #[error("Cart error: {0}")]
    CartStore(#[from] CartStoreError),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Request body over the size limit.
    #[error("Request body too large")]
    PayloadTooLarge,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Upload(err) => match err {
                UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                UploadError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart | CheckoutError::Validation(_) => StatusCode::BAD_REQUEST,
                CheckoutError::Repository(_) | CheckoutError::CartStore(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::CartStore(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client.
    fn public_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Upload(err @ (UploadError::TooLarge { .. } | UploadError::UnsupportedType(_))) => {
                err.to_string()
            }
            Self::Checkout(CheckoutError::EmptyCart) => "Your cart is empty".to_string(),
            Self::Checkout(CheckoutError::Validation(err)) => err.to_string(),
            _ if self.status().is_server_error() => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::PayloadTooLarge;
        }
        Self::BadRequest(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::PayloadTooLarge;
        }
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::PayloadTooLarge;
        }
        Self::BadRequest(err.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
