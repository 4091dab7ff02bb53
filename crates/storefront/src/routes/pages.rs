//! Server-rendered page handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use kedai_core::ProductId;

use super::AppForm;
use super::api::dashboard::DashboardStats;
use super::api::products::ProductQuery;
use super::cart::CartView;
use crate::db::{OrderRepository, ProductFilter, ProductRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::{CustomerInput, Order, Product, User};
use crate::services::{CheckoutError, cart_store, checkout};
use crate::state::AppState;

/// Product display data for the catalog grid.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Formatted for display.
    pub price: String,
    /// Bare amount, posted back by the add-to-cart form.
    pub price_amount: String,
    pub stock: i32,
    pub image_url: Option<String>,
}

impl From<Product> for ProductCard {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            price: product.price.to_string(),
            price_amount: product.price.amount().to_string(),
            name: product.name,
            description: product.description,
            stock: product.stock,
            image_url: product.image_url,
        }
    }
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub products: Vec<ProductCard>,
    pub category: String,
    pub query: String,
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub stats: DashboardStats,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub users: Vec<User>,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub cart: CartView,
    pub customer: CustomerInput,
    pub error: Option<String>,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "callback.html")]
pub struct CallbackTemplate {
    pub order_number: Option<String>,
}

/// Order confirmation query.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub order: Option<String>,
}

/// Display the catalog.
///
/// # Errors
///
/// Returns 500 if the catalog cannot be read.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<IndexTemplate> {
    let category = query.category.clone().unwrap_or_default();
    let search = query.q.clone().unwrap_or_default();
    let filter = ProductFilter::from(query);

    let products = ProductRepository::new(state.pool()).list(&filter).await?;

    Ok(IndexTemplate {
        products: products.into_iter().map(ProductCard::from).collect(),
        category,
        query: search,
    })
}

/// Display the admin dashboard.
///
/// # Errors
///
/// Returns 500 if any table cannot be read.
#[instrument(skip(state))]
pub async fn admin(State(state): State<AppState>) -> Result<AdminTemplate> {
    let pool = state.pool();
    let filter = ProductFilter::default();
    let products = ProductRepository::new(pool);
    let orders = OrderRepository::new(pool);
    let users = UserRepository::new(pool);

    let (stats, products, orders, users) = tokio::try_join!(
        DashboardStats::load(pool),
        products.list(&filter),
        orders.list(),
        users.list(),
    )?;

    Ok(AdminTemplate {
        stats,
        products,
        orders,
        users,
    })
}

/// Display the checkout form with the cart summary.
#[instrument(skip(session))]
pub async fn checkout_page(session: Session) -> CheckoutTemplate {
    let cart = cart_store::load(&session).await;
    CheckoutTemplate {
        cart: CartView::new(&cart, false),
        customer: CustomerInput::default(),
        error: None,
    }
}

/// Place an order for the session cart and redirect to the confirmation.
///
/// Invalid customer details or an empty cart re-render the form with a 400
/// status; nothing is written in that case.
///
/// # Errors
///
/// Returns 500 if the order cannot be stored.
#[instrument(skip(state, session, customer))]
pub async fn checkout_submit(
    State(state): State<AppState>,
    session: Session,
    AppForm(customer): AppForm<CustomerInput>,
) -> Result<Response> {
    let rejected = |message: String, cart: &kedai_core::Cart, customer: CustomerInput| {
        (
            StatusCode::BAD_REQUEST,
            CheckoutTemplate {
                cart: CartView::new(cart, false),
                customer,
                error: Some(message),
            },
        )
            .into_response()
    };

    let validated = match customer.validate() {
        Ok(validated) => validated,
        Err(e) => {
            let cart = cart_store::load(&session).await;
            return Ok(rejected(e.to_string(), &cart, customer));
        }
    };

    match checkout::place_order(state.pool(), &session, validated).await {
        Ok(order) => {
            let target = format!("/callback?order={}", order.order_number);
            Ok(Redirect::to(&target).into_response())
        }
        Err(CheckoutError::EmptyCart) => Ok(rejected(
            "Your cart is empty".to_string(),
            &kedai_core::Cart::new(),
            customer,
        )),
        Err(e) => Err(AppError::from(e)),
    }
}

/// Display the order confirmation.
#[instrument]
pub async fn callback(Query(query): Query<CallbackQuery>) -> impl IntoResponse {
    CallbackTemplate {
        order_number: query.order,
    }
}
