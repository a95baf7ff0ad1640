//! Integration test harness for Shopfront.
//!
//! [`FakeShopify`] is an in-process stand-in for a Shopify store: it answers
//! the Storefront GraphQL operations the storefront sends (dispatching on
//! `operationName`) and the Admin REST product update, keeping carts in
//! memory. [`TestApp`] serves the real storefront router against it.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! No network access or Shopify credentials are needed.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{post, put},
};
use serde_json::{Value, json};

use shopfront_storefront::config::{ShopifyConfig, StorefrontConfig};
use shopfront_storefront::state::AppState;

/// Storefront token the fake store accepts.
pub const STOREFRONT_TOKEN: &str = "test-storefront-token";

/// Admin token the fake store accepts.
pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Public domain reported by the fake shop (checkout URLs live here).
pub const SHOP_DOMAIN: &str = "https://test-shop.example";

/// Legacy id of the single-variant "tee" product.
pub const TEE_PRODUCT_ID: u64 = 1001;

/// Legacy id of the tee's only variant.
pub const TEE_VARIANT_ID: u64 = 55;

/// Legacy ids of the two "mug" variants.
pub const MUG_VARIANT_IDS: [u64; 2] = [56, 57];

/// Simulated latency of `cartCreate`, so concurrent adds actually overlap.
const CART_CREATE_DELAY: Duration = Duration::from_millis(50);

// =============================================================================
// Catalog fixture
// =============================================================================

struct FakeVariant {
    id: u64,
    title: &'static str,
    cents: u64,
}

struct FakeProduct {
    id: u64,
    handle: &'static str,
    title: &'static str,
    description: &'static str,
    variants: Vec<FakeVariant>,
}

fn catalog() -> Vec<FakeProduct> {
    vec![
        FakeProduct {
            id: TEE_PRODUCT_ID,
            handle: "tee",
            title: "Classic Tee",
            description: "A soft cotton tee.",
            variants: vec![FakeVariant {
                id: TEE_VARIANT_ID,
                title: "Default Title",
                cents: 100,
            }],
        },
        FakeProduct {
            id: 1002,
            handle: "mug",
            title: "Enamel Mug",
            description: "",
            variants: vec![
                FakeVariant {
                    id: MUG_VARIANT_IDS[0],
                    title: "White",
                    cents: 1250,
                },
                FakeVariant {
                    id: MUG_VARIANT_IDS[1],
                    title: "Black",
                    cents: 1350,
                },
            ],
        },
    ]
}

fn money(cents: u64) -> Value {
    json!({
        "amount": format!("{}.{:02}", cents / 100, cents % 100),
        "currencyCode": "USD",
    })
}

fn image(handle: &str, title: &str) -> Value {
    json!({
        "url": format!("https://cdn.shopify.com/s/files/{handle}.png"),
        "altText": title,
    })
}

fn variant_gid(id: u64) -> String {
    format!("gid://shopify/ProductVariant/{id}")
}

fn product_json(product: &FakeProduct) -> Value {
    json!({
        "id": format!("gid://shopify/Product/{}", product.id),
        "title": product.title,
        "handle": product.handle,
        "description": product.description,
        "images": { "nodes": [image(product.handle, product.title)] },
        "variants": {
            "nodes": product.variants.iter().map(|v| json!({
                "id": variant_gid(v.id),
                "title": v.title,
                "price": money(v.cents),
            })).collect::<Vec<_>>()
        },
    })
}

fn collection_json(products: &[FakeProduct]) -> Value {
    json!({
        "id": "gid://shopify/Collection/7",
        "title": "Summer",
        "handle": "summer",
        "description": "Warm weather picks.",
        "products": { "nodes": products.iter().map(product_json).collect::<Vec<_>>() },
    })
}

// =============================================================================
// Fake store state
// =============================================================================

#[derive(Clone)]
struct FakeLine {
    id: String,
    variant_id: u64,
    quantity: u64,
}

#[derive(Default)]
struct FakeCart {
    lines: Vec<FakeLine>,
}

/// A product update the fake Admin API received.
#[derive(Debug, Clone)]
pub struct AdminUpdate {
    /// Legacy product id from the URL.
    pub product_id: u64,
    /// Request body as sent.
    pub body: Value,
}

struct Inner {
    catalog: Vec<FakeProduct>,
    carts: Mutex<HashMap<String, FakeCart>>,
    next_id: AtomicU64,
    cart_creates: AtomicUsize,
    graphql_calls: AtomicUsize,
    storefront_failure: Mutex<Option<u16>>,
    admin_failure: Mutex<Option<(u16, Value)>>,
    admin_updates: Mutex<Vec<AdminUpdate>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// In-process fake of the Shopify Storefront and Admin APIs.
#[derive(Clone)]
pub struct FakeShopify {
    addr: SocketAddr,
    inner: Arc<Inner>,
}

impl FakeShopify {
    /// Start the fake store on an ephemeral port.
    pub async fn start() -> Self {
        let inner = Arc::new(Inner {
            catalog: catalog(),
            carts: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            cart_creates: AtomicUsize::new(0),
            graphql_calls: AtomicUsize::new(0),
            storefront_failure: Mutex::new(None),
            admin_failure: Mutex::new(None),
            admin_updates: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/api/{version}/graphql.json", post(graphql))
            .route("/admin/api/{version}/products/{file}", put(admin_update))
            .with_state(Arc::clone(&inner));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Shopify");
        let addr = listener.local_addr().expect("Fake Shopify has no address");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Fake Shopify server error");
        });

        Self { addr, inner }
    }

    /// Origin the storefront should treat as the store.
    #[must_use]
    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Shopify configuration pointing at this fake with both tokens set.
    #[must_use]
    pub fn config(&self) -> ShopifyConfig {
        let mut config = ShopifyConfig::new(self.origin())
            .with_storefront_token(STOREFRONT_TOKEN)
            .with_admin_token(ADMIN_TOKEN);
        config.timeout = Duration::from_secs(5);
        config
    }

    /// Number of `cartCreate` mutations received.
    #[must_use]
    pub fn cart_creates(&self) -> usize {
        self.inner.cart_creates.load(Ordering::SeqCst)
    }

    /// Number of Storefront GraphQL requests received.
    #[must_use]
    pub fn graphql_calls(&self) -> usize {
        self.inner.graphql_calls.load(Ordering::SeqCst)
    }

    /// Product updates received by the Admin API, oldest first.
    #[must_use]
    pub fn admin_updates(&self) -> Vec<AdminUpdate> {
        lock(&self.inner.admin_updates).clone()
    }

    /// Answer every Storefront request with `status`.
    pub fn fail_storefront_with(&self, status: u16) {
        *lock(&self.inner.storefront_failure) = Some(status);
    }

    /// Answer every Admin update with `status` and `body`.
    pub fn fail_admin_with(&self, status: u16, body: Value) {
        *lock(&self.inner.admin_failure) = Some((status, body));
    }

    /// Delete a cart behind the storefront's back (as if it expired).
    pub fn expire_cart(&self, cart_id: &str) {
        lock(&self.inner.carts).remove(cart_id);
    }
}

// =============================================================================
// Storefront GraphQL
// =============================================================================

fn status_response(status: u16, body: Value) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

fn data(value: Value) -> Response {
    Json(json!({ "data": value })).into_response()
}

/// `{ "<field>": payload }`.
fn keyed(field: &str, payload: Value) -> Value {
    let mut object = serde_json::Map::new();
    object.insert(field.to_string(), payload);
    Value::Object(object)
}

fn user_errors(field: &str, path: &[&str], message: &str) -> Response {
    data(keyed(
        field,
        json!({
            "cart": null,
            "userErrors": [{ "field": path, "message": message }],
        }),
    ))
}

async fn graphql(
    State(inner): State<Arc<Inner>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    inner.graphql_calls.fetch_add(1, Ordering::SeqCst);

    let token = headers
        .get("X-Shopify-Storefront-Access-Token")
        .and_then(|v| v.to_str().ok());
    if token != Some(STOREFRONT_TOKEN) {
        return status_response(401, json!({ "errors": "Unauthorized" }));
    }

    let failure = *lock(&inner.storefront_failure);
    if let Some(status) = failure {
        return status_response(status, json!({ "errors": "Internal error" }));
    }

    let variables = &body["variables"];
    let str_var = |name: &str| variables[name].as_str().unwrap_or_default().to_string();

    match body["operationName"].as_str().unwrap_or_default() {
        "GetShop" => data(json!({
            "shop": {
                "id": "gid://shopify/Shop/1",
                "name": "Test Shop",
                "description": "Things for testing.",
                "primaryDomain": { "url": SHOP_DOMAIN },
            }
        })),
        "GetProducts" => {
            let first = usize::try_from(variables["first"].as_u64().unwrap_or(0)).unwrap_or(0);
            let nodes: Vec<Value> = inner.catalog.iter().take(first).map(product_json).collect();
            data(json!({ "products": { "nodes": nodes } }))
        }
        "GetProductByHandle" => {
            let handle = str_var("handle");
            let product = inner
                .catalog
                .iter()
                .find(|p| p.handle == handle)
                .map(product_json);
            data(json!({ "product": product }))
        }
        "GetCollectionByHandle" => {
            let collection = (str_var("handle") == "summer").then(|| collection_json(&inner.catalog));
            data(json!({ "collection": collection }))
        }
        "GetCollections" => data(json!({
            "collections": { "nodes": [collection_json(&inner.catalog)] }
        })),
        "CreateCart" => create_cart(&inner).await,
        "GetCart" => {
            let cart = cart_json(&inner, &str_var("cartId"));
            data(json!({ "cart": cart }))
        }
        "AddToCart" => add_lines(&inner, &str_var("cartId"), &variables["lines"]),
        "UpdateCartLines" => update_lines(&inner, &str_var("cartId"), &variables["lines"]),
        "RemoveFromCart" => remove_lines(&inner, &str_var("cartId"), &variables["lineIds"]),
        other => status_response(
            200,
            json!({ "errors": [{ "message": format!("Unknown operation {other}") }] }),
        ),
    }
}

fn next_id(inner: &Inner) -> u64 {
    inner.next_id.fetch_add(1, Ordering::SeqCst)
}

async fn create_cart(inner: &Inner) -> Response {
    inner.cart_creates.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(CART_CREATE_DELAY).await;

    let cart_id = format!("gid://shopify/Cart/c{}", next_id(inner));
    lock(&inner.carts).insert(cart_id.clone(), FakeCart::default());

    data(json!({
        "cartCreate": {
            "cart": cart_json(inner, &cart_id),
            "userErrors": [],
        }
    }))
}

fn find_variant<'a>(inner: &'a Inner, gid: &str) -> Option<(&'a FakeProduct, &'a FakeVariant)> {
    inner.catalog.iter().find_map(|product| {
        product
            .variants
            .iter()
            .find(|v| variant_gid(v.id) == gid)
            .map(|variant| (product, variant))
    })
}

fn cart_json(inner: &Inner, cart_id: &str) -> Option<Value> {
    let carts = lock(&inner.carts);
    let cart = carts.get(cart_id)?;

    let mut total_quantity = 0;
    let mut total_cents = 0;
    let mut edges = Vec::new();
    for line in &cart.lines {
        let Some((product, variant)) = find_variant(inner, &variant_gid(line.variant_id)) else {
            continue;
        };
        total_quantity += line.quantity;
        total_cents += variant.cents * line.quantity;
        edges.push(json!({
            "node": {
                "id": line.id,
                "quantity": line.quantity,
                "merchandise": {
                    "id": variant_gid(variant.id),
                    "title": variant.title,
                    "product": { "title": product.title, "handle": product.handle },
                    "image": image(product.handle, product.title),
                    "price": money(variant.cents),
                }
            }
        }));
    }

    let suffix = cart_id.rsplit('/').next().unwrap_or(cart_id);
    Some(json!({
        "id": cart_id,
        "checkoutUrl": format!("{SHOP_DOMAIN}/cart/c/{suffix}"),
        "totalQuantity": total_quantity,
        "cost": { "totalAmount": money(total_cents) },
        "lines": { "edges": edges },
    }))
}

fn summary(inner: &Inner, field: &str, cart_id: &str) -> Response {
    let total: u64 = lock(&inner.carts)
        .get(cart_id)
        .map_or(0, |cart| cart.lines.iter().map(|l| l.quantity).sum());
    data(keyed(
        field,
        json!({
            "cart": { "id": cart_id, "totalQuantity": total },
            "userErrors": [],
        }),
    ))
}

fn add_lines(inner: &Inner, cart_id: &str, lines: &Value) -> Response {
    const FIELD: &str = "cartLinesAdd";
    let requested = lines.as_array().cloned().unwrap_or_default();

    {
        let mut carts = lock(&inner.carts);
        let Some(cart) = carts.get_mut(cart_id) else {
            return user_errors(FIELD, &["cartId"], "The specified cart does not exist.");
        };

        for line in &requested {
            let gid = line["merchandiseId"].as_str().unwrap_or_default();
            let quantity = line["quantity"].as_u64().unwrap_or(0);
            let Some((_, variant)) = find_variant(inner, gid) else {
                return user_errors(
                    FIELD,
                    &["lines", "0", "merchandiseId"],
                    "The merchandise with id does not exist.",
                );
            };

            // Shopify merges repeated merchandise into one line
            if let Some(existing) = cart.lines.iter_mut().find(|l| l.variant_id == variant.id) {
                existing.quantity += quantity;
            } else {
                cart.lines.push(FakeLine {
                    id: format!("gid://shopify/CartLine/l{}", next_id(inner)),
                    variant_id: variant.id,
                    quantity,
                });
            }
        }
    }

    summary(inner, FIELD, cart_id)
}

fn update_lines(inner: &Inner, cart_id: &str, lines: &Value) -> Response {
    const FIELD: &str = "cartLinesUpdate";
    let requested = lines.as_array().cloned().unwrap_or_default();

    {
        let mut carts = lock(&inner.carts);
        let Some(cart) = carts.get_mut(cart_id) else {
            return user_errors(FIELD, &["cartId"], "The specified cart does not exist.");
        };

        for line in &requested {
            let id = line["id"].as_str().unwrap_or_default();
            let quantity = line["quantity"].as_u64().unwrap_or(0);
            let Some(existing) = cart.lines.iter_mut().find(|l| l.id == id) else {
                return user_errors(
                    FIELD,
                    &["lines", "0", "id"],
                    "The merchandise line with id does not exist.",
                );
            };
            existing.quantity = quantity;
        }
        cart.lines.retain(|l| l.quantity > 0);
    }

    summary(inner, FIELD, cart_id)
}

fn remove_lines(inner: &Inner, cart_id: &str, line_ids: &Value) -> Response {
    const FIELD: &str = "cartLinesRemove";
    let ids: Vec<String> = line_ids
        .as_array()
        .map(|ids| {
            ids.iter()
                .filter_map(|id| id.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    {
        let mut carts = lock(&inner.carts);
        let Some(cart) = carts.get_mut(cart_id) else {
            return user_errors(FIELD, &["cartId"], "The specified cart does not exist.");
        };
        if let Some(missing) = ids.iter().find(|id| !cart.lines.iter().any(|l| &l.id == *id)) {
            let message = format!("The merchandise line with id {missing} does not exist.");
            return user_errors(FIELD, &["lineIds", "0"], &message);
        }
        cart.lines.retain(|l| !ids.contains(&l.id));
    }

    summary(inner, FIELD, cart_id)
}

// =============================================================================
// Admin REST
// =============================================================================

async fn admin_update(
    State(inner): State<Arc<Inner>>,
    Path((_version, file)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let token = headers
        .get("X-Shopify-Access-Token")
        .and_then(|v| v.to_str().ok());
    if token != Some(ADMIN_TOKEN) {
        return status_response(
            401,
            json!({ "errors": "[API] Invalid API key or access token" }),
        );
    }

    let Some(product_id) = file
        .strip_suffix(".json")
        .and_then(|id| id.parse::<u64>().ok())
    else {
        return status_response(404, json!({ "errors": "Not Found" }));
    };

    lock(&inner.admin_updates).push(AdminUpdate {
        product_id,
        body: body.clone(),
    });

    let failure = lock(&inner.admin_failure).clone();
    if let Some((status, failure)) = failure {
        return status_response(status, failure);
    }

    let product = inner.catalog.iter().find(|p| p.id == product_id);
    let Some(product) = product else {
        return status_response(404, json!({ "errors": "Not Found" }));
    };

    let update = &body["product"];
    let title = update["title"].as_str().unwrap_or(product.title);
    let variants: Vec<Value> = product
        .variants
        .iter()
        .map(|v| {
            let price = update["variants"][0]["price"]
                .as_str()
                .map_or_else(|| money(v.cents)["amount"].clone(), |p| json!(p));
            json!({ "id": v.id, "title": v.title, "price": price })
        })
        .collect();

    Json(json!({
        "product": {
            "id": product_id,
            "title": title,
            "handle": product.handle,
            "variants": variants,
        }
    }))
    .into_response()
}

// =============================================================================
// Storefront under test
// =============================================================================

/// Storefront configuration for tests against `shopify`.
#[must_use]
pub fn storefront_config(shopify: ShopifyConfig) -> StorefrontConfig {
    StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        products_per_page: 10,
        shopify,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A running storefront plus a cookie-keeping client for it.
pub struct TestApp {
    /// Base URL of the storefront, without trailing slash.
    pub base_url: String,
    /// Client that keeps the session cookie and does not follow redirects.
    pub client: reqwest::Client,
}

impl TestApp {
    /// Serve the storefront on an ephemeral port.
    pub async fn spawn(shopify: ShopifyConfig) -> Self {
        let app = shopfront_storefront::app(AppState::new(storefront_config(shopify)));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind storefront");
        let addr = listener.local_addr().expect("Storefront has no address");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Storefront server error");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: Self::new_client(),
        }
    }

    /// A fresh client (a new visitor with no session).
    #[must_use]
    pub fn new_client() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
