//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (shop header + first products)
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /products               - Product listing (?first=N, max 50)
//! GET  /products/:handle       - Product detail
//! GET  /collections            - Collection listing
//! GET  /collections/:handle    - Collection detail
//!
//! # Cart (HTMX fragments, redirects for plain forms)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (count fragment, triggers cart-updated)
//! POST /cart/update            - Update quantity, 0 removes (cart_items fragment)
//! POST /cart/remove            - Remove item (cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Redirect to Shopify checkout
//!
//! # Product admin
//! GET  /admin/products/:handle/edit - Edit form
//! POST /admin/products/:handle/edit - Submit edit form
//! PUT  /api/update-product          - JSON relay to the Admin API
//! ```

pub mod admin;
pub mod cart;
pub mod collections;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{handle}", get(products::show))
}

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(collections::index))
        .route("/{handle}", get(collections::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the product admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new().route(
        "/products/{handle}/edit",
        get(admin::edit_page).post(admin::edit_submit),
    )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product routes
        .nest("/products", product_routes())
        // Collection routes
        .nest("/collections", collection_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout redirect
        .route("/checkout", get(cart::checkout))
        // Product admin
        .nest("/admin", admin_routes())
        .route("/api/update-product", put(admin::update_product))
}
