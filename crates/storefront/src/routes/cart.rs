//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every mutation loads the cart from the session, applies the change, saves
//! it back and returns the freshly rendered popup. Lines are addressed by
//! their position in the cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::Query,
    response::{AppendHeaders, IntoResponse},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use kedai_core::{Cart, CartLineItem, Price, ProductId};

use super::AppForm;
use crate::error::{AppError, add_breadcrumb};
use crate::models::ValidationError;
use crate::services::cart_store;

/// HTMX event fired after every cart mutation so badges can refresh.
pub const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub index: usize,
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image_url: Option<String>,
}

/// Cart display data for templates.
///
/// Purely derived from a [`Cart`]; `open` is the popup's show/hide flag.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u64,
    pub open: bool,
}

impl CartView {
    /// Render `cart` for display.
    #[must_use]
    pub fn new(cart: &Cart, open: bool) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .enumerate()
                .map(|(index, line)| CartItemView {
                    index,
                    product_id: line.product_id(),
                    name: line.name().to_string(),
                    quantity: line.quantity(),
                    price: line.unit_price().to_string(),
                    line_price: line.line_total().to_string(),
                    image_url: line.image_ref().map(String::from),
                })
                .collect(),
            total: cart.total().to_string(),
            item_count: cart.item_count(),
            open,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart popup fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_popup.html")]
pub struct CartPopupTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Popup visibility query.
#[derive(Debug, Default, Deserialize)]
pub struct ShowCartQuery {
    #[serde(default)]
    pub open: bool,
}

/// Add to cart form data.
///
/// The product snapshot comes from the catalog page; the id is not checked
/// against the catalog.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub index: usize,
    pub delta: i32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub index: usize,
}

/// Cart contents as JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartLineItem>,
    pub total: Price,
    pub item_count: u64,
}

/// Response to a cart mutation: the open popup plus the update trigger.
pub type CartPopupResponse = (AppendHeaders<[(&'static str, &'static str); 1]>, CartPopupTemplate);

/// Save the cart and render the open popup with the update trigger.
async fn respond_with_popup(session: &Session, cart: &Cart) -> Result<CartPopupResponse, AppError> {
    cart_store::save(session, cart).await?;

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartPopupTemplate {
            cart: CartView::new(cart, true),
        },
    ))
}

/// Display the cart popup (HTMX).
#[instrument(skip(session))]
pub async fn show(session: Session, Query(query): Query<ShowCartQuery>) -> impl IntoResponse {
    let cart = cart_store::load(&session).await;
    CartPopupTemplate {
        cart: CartView::new(&cart, query.open),
    }
}

/// Add one unit of a product to the cart (HTMX).
///
/// # Errors
///
/// Returns 400 if the name is blank or the price does not parse.
#[instrument(skip(session), fields(product_id = %form.id))]
pub async fn add(
    session: Session,
    AppForm(form): AppForm<AddToCartForm>,
) -> Result<CartPopupResponse, AppError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ValidationError::Missing("name").into());
    }
    let price = form
        .price
        .parse::<Price>()
        .map_err(|e| ValidationError::invalid("price", e))?;
    let image_url = form.image_url.filter(|url| !url.trim().is_empty());

    let mut cart = cart_store::load(&session).await;
    cart.add_item(form.id, name, price, image_url);
    let product_id = form.id.to_string();
    add_breadcrumb("cart", "Added product", Some(&[("product_id", product_id.as_str())]));

    respond_with_popup(&session, &cart).await
}

/// Change the quantity of a cart line by `delta` (HTMX).
///
/// A line that drops to zero is removed; an unknown index changes nothing.
///
/// # Errors
///
/// Returns 500 if the session cannot be written.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    AppForm(form): AppForm<UpdateCartForm>,
) -> Result<CartPopupResponse, AppError> {
    let mut cart = cart_store::load(&session).await;
    if !cart.change_quantity(form.index, form.delta) {
        tracing::debug!(index = form.index, "cart update for missing line ignored");
    }
    respond_with_popup(&session, &cart).await
}

/// Remove a cart line (HTMX).
///
/// # Errors
///
/// Returns 500 if the session cannot be written.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    AppForm(form): AppForm<RemoveFromCartForm>,
) -> Result<CartPopupResponse, AppError> {
    let mut cart = cart_store::load(&session).await;
    if cart.remove_item(form.index).is_none() {
        tracing::debug!(index = form.index, "cart remove for missing line ignored");
    }
    respond_with_popup(&session, &cart).await
}

/// Empty the cart (HTMX).
///
/// # Errors
///
/// Returns 500 if the session cannot be written.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<CartPopupResponse, AppError> {
    let mut cart = cart_store::load(&session).await;
    cart.clear();
    respond_with_popup(&session, &cart).await
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart = cart_store::load(&session).await;
    CartCountTemplate {
        count: cart.item_count(),
    }
}

/// Cart contents as JSON.
#[instrument(skip(session))]
pub async fn json(session: Session) -> Json<CartResponse> {
    let cart = cart_store::load(&session).await;
    Json(CartResponse {
        total: cart.total(),
        item_count: cart.item_count(),
        items: cart.items().to_vec(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(ProductId::new(1), "Kopi Gayo", Price::from_whole(10_000), None);
        cart.add_item(ProductId::new(1), "Kopi Gayo", Price::from_whole(10_000), None);
        cart.add_item(
            ProductId::new(2),
            "Gula Aren",
            Price::from_whole(5_000),
            Some("/uploads/gula.png".to_string()),
        );
        cart
    }

    #[test]
    fn test_view_derives_from_cart() {
        let view = CartView::new(&sample_cart(), false);

        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].quantity, 2);
        assert_eq!(view.items[0].line_price, "Rp 20.000");
        assert_eq!(view.items[1].index, 1);
        assert_eq!(view.items[1].image_url.as_deref(), Some("/uploads/gula.png"));
        assert_eq!(view.total, "Rp 25.000");
        assert_eq!(view.item_count, 3);
        assert!(!view.open);
    }

    #[test]
    fn test_popup_renders_lines_and_total() {
        let html = CartPopupTemplate {
            cart: CartView::new(&sample_cart(), true),
        }
        .render()
        .unwrap();

        assert!(html.contains("Kopi Gayo"));
        assert!(html.contains("Rp 25.000"));
        assert!(html.contains("cart-popup open"));
    }

    #[test]
    fn test_empty_popup() {
        let html = CartPopupTemplate {
            cart: CartView::new(&Cart::new(), false),
        }
        .render()
        .unwrap();

        assert!(html.contains("Your cart is empty"));
        assert!(!html.contains("cart-popup open"));
    }

    #[test]
    fn test_count_badge() {
        let html = CartCountTemplate { count: 3 }.render().unwrap();
        assert!(html.contains('3'));
    }
}
