//! Admin dashboard summary.

use axum::{Json, extract::State};
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use kedai_core::Price;

use crate::db::{OrderRepository, ProductRepository, RepositoryError, UserRepository};
use crate::error::Result;
use crate::state::AppState;

/// Summary counts shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_users: i64,
    /// Sum of paid orders only.
    pub total_revenue: Price,
}

impl DashboardStats {
    /// Gather the stats concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first failing query's error.
    pub async fn load(pool: &PgPool) -> std::result::Result<Self, RepositoryError> {
        let products = ProductRepository::new(pool);
        let orders = OrderRepository::new(pool);
        let users = UserRepository::new(pool);

        let (total_products, total_orders, total_users, total_revenue) = tokio::try_join!(
            products.count(),
            orders.count(),
            users.count(),
            orders.paid_revenue(),
        )?;

        Ok(Self {
            total_products,
            total_orders,
            total_users,
            total_revenue,
        })
    }
}

/// Dashboard stats as JSON.
///
/// # Errors
///
/// Returns 500 if a query fails.
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    Ok(Json(DashboardStats::load(state.pool()).await?))
}
