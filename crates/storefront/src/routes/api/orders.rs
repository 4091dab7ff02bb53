//! Order API handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use kedai_core::OrderId;

use crate::db::{OrderRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::{Order, OrderRequest, OrderUpdate};
use crate::routes::AppJson;
use crate::state::AppState;

/// `{message, order}` response body.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub message: &'static str,
    pub order: Order,
}

/// List all orders with their product references resolved.
///
/// # Errors
///
/// Returns 500 if the query fails.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    Ok(Json(OrderRepository::new(state.pool()).list().await?))
}

/// Place an order from a JSON body.
///
/// # Errors
///
/// Returns 400 if the order is invalid.
#[instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    AppJson(request): AppJson<OrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    let new_order = request.validate()?;
    let order = OrderRepository::new(state.pool()).create(&new_order).await?;

    tracing::info!(order_number = %order.order_number, total = %order.total_amount, "order created");
    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            message: "Order created",
            order,
        }),
    ))
}

/// Change an order's status and/or payment status.
///
/// # Errors
///
/// Returns 400 if neither field is given, 404 if the order doesn't exist.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    AppJson(update): AppJson<OrderUpdate>,
) -> Result<Json<OrderResponse>> {
    if update.is_empty() {
        return Err(AppError::BadRequest(
            "status or paymentStatus is required".to_string(),
        ));
    }

    let order = OrderRepository::new(state.pool())
        .update(id, &update)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Order"),
            other => other.into(),
        })?;

    Ok(Json(OrderResponse {
        message: "Order updated",
        order,
    }))
}
