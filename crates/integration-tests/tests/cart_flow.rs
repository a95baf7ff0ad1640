//! Integration tests for the cart manager against the fake Shopify store.
//!
//! Every mutation is followed by a refetch, so the carts asserted on here are
//! exactly what the store reports.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use shopfront_core::{CartId, CartLineId, VariantId};
use shopfront_integration_tests::{FakeShopify, MUG_VARIANT_IDS, SHOP_DOMAIN, TEE_VARIANT_ID};
use shopfront_storefront::cart::{CartError, CartManager, CartSession};
use shopfront_storefront::shopify::{Cart, ShopifyError, StorefrontClient};
use tower_sessions::{MemoryStore, Session};

fn new_session() -> CartSession {
    CartSession::new(Session::new(None, Arc::new(MemoryStore::default()), None))
}

async fn setup() -> (FakeShopify, CartManager) {
    let shopify = FakeShopify::start().await;
    let carts = CartManager::new(StorefrontClient::new(&shopify.config()));
    (shopify, carts)
}

fn tee() -> VariantId {
    VariantId::from_legacy_id(TEE_VARIANT_ID)
}

fn total(cart: &Cart) -> Option<String> {
    cart.total.as_ref().map(|price| price.amount.to_string())
}

// =============================================================================
// Create / Get
// =============================================================================

#[tokio::test]
async fn test_create_cart_is_empty_with_checkout_url() {
    let (_shopify, carts) = setup().await;
    let session = new_session();

    let cart = carts.create_cart(&session).await.unwrap();

    assert!(cart.is_empty());
    assert_eq!(cart.total_quantity, 0);
    assert_eq!(total(&cart).as_deref(), Some("0.00"));
    assert!(cart.checkout_url.starts_with(SHOP_DOMAIN));
    assert_eq!(session.cart_id().await.unwrap(), Some(cart.id.clone()));

    let fetched = carts.get_cart(&cart.id).await.unwrap();
    assert_eq!(fetched.id, cart.id);
}

#[tokio::test]
async fn test_current_cart_is_none_for_new_visitor() {
    let (shopify, carts) = setup().await;

    assert!(carts.current_cart(&new_session()).await.unwrap().is_none());
    // Nothing is created just by looking
    assert_eq!(shopify.cart_creates(), 0);
}

#[tokio::test]
async fn test_get_unknown_cart_is_not_found() {
    let (_shopify, carts) = setup().await;

    let err = carts
        .get_cart(&CartId::new("gid://shopify/Cart/missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, CartError::Shopify(ShopifyError::NotFound(_))));
}

// =============================================================================
// Line mutations
// =============================================================================

#[tokio::test]
async fn test_add_creates_cart_lazily() {
    let (shopify, carts) = setup().await;
    let session = new_session();

    let cart = carts.add_line(&session, tee(), 2).await.unwrap();

    assert_eq!(shopify.cart_creates(), 1);
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].quantity.get(), 2);
    assert_eq!(cart.lines[0].merchandise.id, tee());
    assert_eq!(cart.lines[0].merchandise.product_handle, "tee");
    assert_eq!(cart.total_quantity, 2);
    assert_eq!(total(&cart).as_deref(), Some("2.00"));

    // A second add reuses the stored cart
    let cart = carts.add_line(&session, tee(), 1).await.unwrap();
    assert_eq!(shopify.cart_creates(), 1);
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.total_quantity, 3);
}

#[tokio::test]
async fn test_update_and_remove_lines() {
    let (_shopify, carts) = setup().await;
    let session = new_session();

    carts.add_line(&session, tee(), 1).await.unwrap();
    let cart = carts
        .add_line(&session, VariantId::from_legacy_id(MUG_VARIANT_IDS[1]), 1)
        .await
        .unwrap();
    assert_eq!(cart.lines.len(), 2);
    assert_eq!(total(&cart).as_deref(), Some("14.50"));

    let tee_line = cart.lines[0].id.clone();
    let mug_line = cart.lines[1].id.clone();

    let cart = carts.update_line(&session, tee_line.clone(), 5).await.unwrap();
    assert_eq!(cart.line(&tee_line).unwrap().quantity.get(), 5);
    assert_eq!(cart.total_quantity, 6);

    // Zero quantity removes the line
    let cart = carts.update_line(&session, tee_line.clone(), 0).await.unwrap();
    assert!(cart.line(&tee_line).is_none());
    assert_eq!(cart.lines.len(), 1);

    let cart = carts.remove_line(&session, mug_line).await.unwrap();
    assert!(cart.is_empty());
    assert_eq!(cart.total_quantity, 0);
    assert_eq!(total(&cart).as_deref(), Some("0.00"));
}

#[tokio::test]
async fn test_refetch_is_stable() {
    let (_shopify, carts) = setup().await;
    let session = new_session();

    let added = carts.add_line(&session, tee(), 2).await.unwrap();
    let first = carts.current_cart(&session).await.unwrap().unwrap();
    let second = carts.current_cart(&session).await.unwrap().unwrap();

    assert_eq!(first, added);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unknown_line_is_user_error() {
    let (_shopify, carts) = setup().await;
    let session = new_session();
    carts.add_line(&session, tee(), 1).await.unwrap();

    let err = carts
        .update_line(&session, CartLineId::new("gid://shopify/CartLine/nope"), 2)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CartError::Shopify(ShopifyError::UserError(ref msg)) if msg.starts_with("lines.0.id:")
    ));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_unknown_variant_is_user_error() {
    let (_shopify, carts) = setup().await;

    let err = carts
        .add_line(&new_session(), VariantId::from_legacy_id(999), 1)
        .await
        .unwrap_err();
    assert!(err.is_client_error());
}

// =============================================================================
// Single-flight creation
// =============================================================================

#[tokio::test]
async fn test_concurrent_adds_create_one_cart() {
    let (shopify, carts) = setup().await;
    let session = new_session();

    let (a, b, c) = tokio::join!(
        carts.add_line(&session, tee(), 1),
        carts.add_line(&session, tee(), 1),
        carts.add_line(&session, tee(), 1),
    );
    let ids = [a.unwrap().id, b.unwrap().id, c.unwrap().id];

    assert_eq!(shopify.cart_creates(), 1);
    assert!(ids.iter().all(|id| *id == ids[0]));

    let cart = carts.current_cart(&session).await.unwrap().unwrap();
    assert_eq!(cart.total_quantity, 3);
}

#[tokio::test]
async fn test_separate_visitors_get_separate_carts() {
    let (shopify, carts) = setup().await;

    let (session_a, session_b) = (new_session(), new_session());
    let (a, b) = tokio::join!(
        carts.add_line(&session_a, tee(), 1),
        carts.add_line(&session_b, tee(), 1),
    );

    assert_eq!(shopify.cart_creates(), 2);
    assert_ne!(a.unwrap().id, b.unwrap().id);
}

#[tokio::test]
async fn test_expired_cart_is_forgotten_and_replaced() {
    let (shopify, carts) = setup().await;
    let session = new_session();

    let old = carts.add_line(&session, tee(), 1).await.unwrap();
    shopify.expire_cart(old.id.as_str());

    assert!(carts.current_cart(&session).await.unwrap().is_none());
    assert_eq!(session.cart_id().await.unwrap(), None);

    // The next add creates a fresh cart rather than reusing the dead id
    let cart = carts.add_line(&session, tee(), 1).await.unwrap();
    assert_eq!(shopify.cart_creates(), 2);
    assert_ne!(cart.id, old.id);
    assert_eq!(cart.total_quantity, 1);
}

#[tokio::test]
async fn test_add_to_expired_cart_starts_a_new_one() {
    let (shopify, carts) = setup().await;
    let session = new_session();

    let old = carts.add_line(&session, tee(), 1).await.unwrap();
    shopify.expire_cart(old.id.as_str());

    // No read in between: the add itself notices the cart is gone
    let cart = carts.add_line(&session, tee(), 2).await.unwrap();
    assert_eq!(shopify.cart_creates(), 2);
    assert_ne!(cart.id, old.id);
    assert_eq!(cart.total_quantity, 2);
    assert_eq!(session.cart_id().await.unwrap(), Some(cart.id.clone()));

    // And keeps working on the replacement afterwards
    let cart = carts.add_line(&session, tee(), 1).await.unwrap();
    assert_eq!(shopify.cart_creates(), 2);
    assert_eq!(cart.total_quantity, 3);
}

#[tokio::test]
async fn test_update_on_expired_cart_clears_it() {
    let (shopify, carts) = setup().await;
    let session = new_session();

    let cart = carts.add_line(&session, tee(), 1).await.unwrap();
    let line_id = cart.lines[0].id.clone();
    shopify.expire_cart(cart.id.as_str());

    let err = carts.update_line(&session, line_id.clone(), 4).await.unwrap_err();
    assert!(matches!(err, CartError::NoCart));
    assert_eq!(session.cart_id().await.unwrap(), None);

    // Removal of a line from the dead cart reads the same way
    let err = carts.remove_line(&session, line_id).await.unwrap_err();
    assert!(matches!(err, CartError::NoCart));
}
