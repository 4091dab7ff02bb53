//! Request extractors whose rejections render as `{"error": ...}`.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` with the rejection mapped to [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Form` with the rejection mapped to [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct AppForm<T>(pub T);
