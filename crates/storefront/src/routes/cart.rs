//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Plain form posts (no `HX-Request` header) are answered with a redirect to
//! `/cart`, so the pages also work without JavaScript.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::{CartLineId, Price, VariantId};

use crate::cart::{CartError, CartSession};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::shopify::{Cart, CartLine};
use crate::state::AppState;

/// Event fired for HTMX listeners (cart badge) after a mutation.
const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub variant_title: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image_url: Option<String>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
    pub checkout_url: Option<String>,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Price::display_or_dash(None),
            item_count: 0,
            checkout_url: None,
        }
    }
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines.iter().map(CartItemView::from).collect(),
            total: Price::display_or_dash(cart.total.as_ref()),
            item_count: cart.total_quantity,
            checkout_url: Some(cart.checkout_url.clone()),
        }
    }
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        let merchandise = &line.merchandise;
        let quantity = line.quantity.get();
        let line_price = merchandise.price.as_ref().and_then(|unit| {
            let amount = unit.amount.checked_mul(Decimal::from(quantity))?;
            Some(Price::new(amount, unit.currency_code.clone()))
        });

        Self {
            id: line.id.to_string(),
            handle: merchandise.product_handle.clone(),
            title: merchandise.product_title.clone(),
            variant_title: Some(merchandise.title.clone()).filter(|t| t != "Default Title"),
            quantity,
            price: Price::display_or_dash(merchandise.price.as_ref()),
            line_price: Price::display_or_dash(line_price.as_ref()),
            image_url: merchandise.image.as_ref().map(|image| image.url.clone()),
        }
    }
}

/// Whether the request came from HTMX.
fn is_htmx(headers: &HeaderMap) -> bool {
    headers.get("HX-Request").is_some_and(|v| v == "true")
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub variant_id: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Respond to a failed cart mutation.
///
/// HTMX callers get a small error fragment they can swap in; everyone else
/// gets the regular error response.
fn mutation_failure(htmx: bool, err: CartError) -> Response {
    if !htmx {
        return AppError::from(err).into_response();
    }

    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!(error = %err, "Cart update failed");
        StatusCode::BAD_GATEWAY
    };
    (
        status,
        Html("<span class=\"cart-error\">Could not update your cart</span>"),
    )
        .into_response()
}

/// The visitor's cart, or `None` when missing or unreadable.
async fn load_cart(state: &AppState, session: &CartSession) -> Option<Cart> {
    state
        .carts()
        .current_cart(session)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load cart");
            None
        })
}

/// Give a new visitor a persisted session before their first add.
///
/// Without this, concurrent first adds arrive with no session cookie, land in
/// separate sessions and each create a cart. Browsing pages (and the count
/// badge every page loads) pins the session so those adds share one
/// visitor key.
pub(crate) async fn establish_visitor(session: &CartSession) {
    if let Err(e) = session.visitor_key().await {
        tracing::warn!(error = %e, "Failed to establish visitor session");
    }
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: CartSession) -> CartShowTemplate {
    establish_visitor(&session).await;
    let cart = load_cart(&state, &session)
        .await
        .as_ref()
        .map_or_else(CartView::empty, CartView::from);

    CartShowTemplate { cart }
}

/// Add item to cart.
///
/// Creates the cart on first use. HTMX callers get the updated count badge.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: CartSession,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let htmx = is_htmx(&headers);
    let variant_id = form.variant_id.trim();
    if variant_id.is_empty() {
        return AppError::BadRequest("variant_id is required".to_string()).into_response();
    }

    let quantity = form.quantity.unwrap_or(1);
    add_breadcrumb("cart", "Add to cart", Some(&[("variant_id", variant_id)]));

    match state
        .carts()
        .add_line(&session, VariantId::new(variant_id), quantity)
        .await
    {
        Ok(cart) if htmx => (
            AppendHeaders([CART_UPDATED_TRIGGER]),
            CartCountTemplate {
                count: cart.total_quantity,
            },
        )
            .into_response(),
        Ok(_) => Redirect::to("/cart").into_response(),
        Err(e) => mutation_failure(htmx, e),
    }
}

/// Update cart item quantity. Zero removes the line.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: CartSession,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let htmx = is_htmx(&headers);
    let result = state
        .carts()
        .update_line(&session, CartLineId::new(form.line_id), form.quantity)
        .await;

    mutation_response(htmx, result)
}

/// Remove item from cart.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: CartSession,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let htmx = is_htmx(&headers);
    let result = state
        .carts()
        .remove_line(&session, CartLineId::new(form.line_id))
        .await;

    mutation_response(htmx, result)
}

/// Render the refreshed cart after an update or removal.
fn mutation_response(htmx: bool, result: Result<Cart, CartError>) -> Response {
    match result {
        Ok(cart) if htmx => (
            AppendHeaders([CART_UPDATED_TRIGGER]),
            CartItemsTemplate {
                cart: CartView::from(&cart),
            },
        )
            .into_response(),
        Ok(_) => Redirect::to("/cart").into_response(),
        Err(e) => mutation_failure(htmx, e),
    }
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: CartSession) -> CartCountTemplate {
    establish_visitor(&session).await;
    let count = load_cart(&state, &session)
        .await
        .map_or(0, |cart| cart.total_quantity);

    CartCountTemplate { count }
}

/// Redirect to Shopify checkout.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: CartSession) -> Redirect {
    match load_cart(&state, &session).await {
        Some(cart) if !cart.is_empty() => Redirect::to(&cart.checkout_url),
        _ => Redirect::to("/cart"),
    }
}

#[cfg(test)]
mod tests {
    use shopfront_core::{CartId, CurrencyCode, Quantity};

    use super::*;
    use crate::shopify::CartMerchandise;

    fn cart() -> Cart {
        let eur = |cents| Price::new(Decimal::new(cents, 2), CurrencyCode::EUR);
        Cart {
            id: CartId::new("gid://shopify/Cart/c1"),
            checkout_url: "https://shop.test/cart/c/c1".to_string(),
            total_quantity: 3,
            total: Some(eur(7500)),
            lines: vec![CartLine {
                id: CartLineId::new("gid://shopify/CartLine/1"),
                quantity: Quantity::new(3).unwrap_or(Quantity::ONE),
                merchandise: CartMerchandise {
                    id: VariantId::from_legacy_id(55),
                    title: "Default Title".to_string(),
                    product_title: "Tee".to_string(),
                    product_handle: "tee".to_string(),
                    image: None,
                    price: Some(eur(2500)),
                },
            }],
        }
    }

    #[test]
    fn test_cart_view() {
        let view = CartView::from(&cart());
        assert_eq!(view.item_count, 3);
        assert_eq!(view.total, "€75.00");

        let item = &view.items[0];
        assert_eq!(item.variant_title, None);
        assert_eq!(item.price, "€25.00");
        assert_eq!(item.line_price, "€75.00");
    }

    #[test]
    fn test_line_total_overflow_shows_dash() {
        let mut cart = cart();
        if let Some(price) = cart.lines[0].merchandise.price.as_mut() {
            price.amount = Decimal::MAX;
        }

        let item = CartItemView::from(&cart.lines[0]);
        assert_eq!(item.line_price, "-");
        assert_ne!(item.price, "-");
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::empty();
        assert_eq!(view.total, "-");
        assert!(view.checkout_url.is_none());
    }

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("HX-Request", axum::http::HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
    }
}
