//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` request/response envelopes with `reqwest` 0.13 for
//! HTTP. Every response is validated in `conversions` before it leaves this
//! module. Nothing is cached: Shopify is the source of truth.

mod conversions;
pub mod queries;

use std::sync::Arc;

use graphql_client::{GraphQLQuery, Response};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use crate::config::ShopifyConfig;
use crate::shopify::types::{
    Cart, CartLineInput, CartLineUpdateInput, CartSummary, Collection, Product, ShopInfo,
};
use crate::shopify::{GraphQLError, GraphQLErrorLocation, ShopifyError, truncate_body};
use shopfront_core::{CartId, CartLineId};

use conversions::{
    convert_cart, convert_cart_summary, convert_collection, convert_collections, convert_product,
    convert_products, convert_shop, user_errors_message,
};
use queries::{
    AddToCart, CartLineInputVar, CartLineUpdateVar, CartLinesPayload, CreateCart, GetCart,
    GetCollectionByHandle, GetCollections, GetProductByHandle, GetProducts, GetShop,
    RemoveFromCart, UpdateCartLines, add_to_cart, create_cart, get_cart, get_collection_by_handle,
    get_collections, get_products, get_product_by_handle, remove_from_cart, update_cart_lines,
};

/// Header carrying the public Storefront API access token.
const STOREFRONT_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

/// Products selected per collection in collection queries.
const COLLECTION_PRODUCT_COUNT: i64 = 50;

/// Collections fetched by [`StorefrontClient::get_collections`].
const COLLECTION_LIMIT: i64 = 10;

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: Option<SecretString>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    ///
    /// A missing access token is not an error here; every call then fails
    /// with [`ShopifyError::MissingCredential`].
    #[must_use]
    pub fn new(config: &ShopifyConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            inner: Arc::new(StorefrontClientInner {
                client,
                endpoint: config.storefront_endpoint(),
                access_token: config.storefront_token.clone(),
            }),
        }
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError>
    where
        Q::Variables: serde::Serialize,
    {
        let token = self
            .inner
            .access_token
            .as_ref()
            .ok_or(ShopifyError::MissingCredential("SHOPIFY_STOREFRONT_TOKEN"))?;

        let request_body = Q::build_query(variables);
        debug!(operation = request_body.operation_name, "Sending Storefront request");

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(STOREFRONT_TOKEN_HEADER, token.expose_secret())
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Read as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate_body(&response_text, 500),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                body: truncate_body(&response_text, 200),
            });
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %truncate_body(&response_text, 500),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(convert_graphql_error).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %truncate_body(&response_text, 500),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::GraphQL(vec![GraphQLError::message("No data in response")])
        })
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get the shop's name, description and primary domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the response is invalid.
    #[instrument(skip(self))]
    pub async fn get_shop_info(&self) -> Result<ShopInfo, ShopifyError> {
        let data = self.execute::<GetShop>(queries::get_shop::Variables).await?;
        convert_shop(data.shop)
    }

    /// Get the first `first` products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or any product is invalid.
    #[instrument(skip(self))]
    pub async fn get_products(&self, first: u32) -> Result<Vec<Product>, ShopifyError> {
        let variables = get_products::Variables {
            first: i64::from(first),
        };
        let data = self.execute::<GetProducts>(variables).await?;
        convert_products(data.products.nodes)
    }

    /// Get a product by its handle.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if no product has this handle, or
    /// another error if the request fails or the product is invalid.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError> {
        let variables = get_product_by_handle::Variables {
            handle: handle.to_string(),
        };
        let data = self.execute::<GetProductByHandle>(variables).await?;

        let product = data
            .product
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {handle}")))?;
        convert_product(product)
    }

    /// Get a collection and its products by handle.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if no collection has this handle, or
    /// another error if the request fails or the collection is invalid.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_collection_by_handle(
        &self,
        handle: &str,
    ) -> Result<Collection, ShopifyError> {
        let variables = get_collection_by_handle::Variables {
            handle: handle.to_string(),
            product_count: COLLECTION_PRODUCT_COUNT,
        };
        let data = self.execute::<GetCollectionByHandle>(variables).await?;

        let collection = data
            .collection
            .ok_or_else(|| ShopifyError::NotFound(format!("Collection not found: {handle}")))?;
        convert_collection(collection)
    }

    /// Get all collections with their products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or any collection is invalid.
    #[instrument(skip(self))]
    pub async fn get_collections(&self) -> Result<Vec<Collection>, ShopifyError> {
        let variables = get_collections::Variables {
            first: COLLECTION_LIMIT,
            product_count: COLLECTION_PRODUCT_COUNT,
        };
        let data = self.execute::<GetCollections>(variables).await?;
        convert_collections(data.collections.nodes)
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Create a new, empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart creation fails or user errors are returned.
    #[instrument(skip(self))]
    pub async fn create_cart(&self) -> Result<Cart, ShopifyError> {
        let data = self.execute::<CreateCart>(create_cart::Variables).await?;

        if let Some(result) = data.cart_create {
            if let Some(message) = user_errors_message(&result.user_errors) {
                return Err(ShopifyError::UserError(message));
            }

            if let Some(cart) = result.cart {
                return convert_cart(cart);
            }
        }

        Err(ShopifyError::GraphQL(vec![GraphQLError::message(
            "Failed to create cart",
        )]))
    }

    /// Get an existing cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the cart does not exist or has
    /// expired, or another error if the request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<Cart, ShopifyError> {
        let variables = get_cart::Variables {
            cart_id: cart_id.to_string(),
        };
        let data = self.execute::<GetCart>(variables).await?;

        let cart = data
            .cart
            .ok_or_else(|| ShopifyError::NotFound(format!("Cart not found: {cart_id}")))?;
        convert_cart(cart)
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id, lines = lines.len()))]
    pub async fn add_to_cart(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<CartSummary, ShopifyError> {
        let variables = add_to_cart::Variables {
            cart_id: cart_id.to_string(),
            lines: lines
                .into_iter()
                .map(|line| CartLineInputVar {
                    merchandise_id: line.merchandise_id.into_inner(),
                    quantity: i64::from(line.quantity),
                })
                .collect(),
        };

        let data = self.execute::<AddToCart>(variables).await?;
        mutation_summary(data.cart_lines_add, "Failed to add to cart")
    }

    /// Set the quantity of existing cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id, lines = lines.len()))]
    pub async fn update_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<CartSummary, ShopifyError> {
        let variables = update_cart_lines::Variables {
            cart_id: cart_id.to_string(),
            lines: lines
                .into_iter()
                .map(|line| CartLineUpdateVar {
                    id: line.id.into_inner(),
                    quantity: i64::from(line.quantity),
                })
                .collect(),
        };

        let data = self.execute::<UpdateCartLines>(variables).await?;
        mutation_summary(data.cart_lines_update, "Failed to update cart")
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id, lines = line_ids.len()))]
    pub async fn remove_from_cart(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<CartSummary, ShopifyError> {
        let variables = remove_from_cart::Variables {
            cart_id: cart_id.to_string(),
            line_ids: line_ids.into_iter().map(CartLineId::into_inner).collect(),
        };

        let data = self.execute::<RemoveFromCart>(variables).await?;
        mutation_summary(data.cart_lines_remove, "Failed to remove from cart")
    }
}

/// Unwrap a cart line mutation payload, surfacing user errors.
///
/// A user error on the `cartId` argument means the cart itself is gone
/// (expired or completed) and is reported as `ShopifyError::NotFound`.
fn mutation_summary(
    payload: Option<CartLinesPayload>,
    failure: &str,
) -> Result<CartSummary, ShopifyError> {
    if let Some(result) = payload {
        if let Some(message) = user_errors_message(&result.user_errors) {
            let cart_gone = result.user_errors.iter().any(|e| {
                e.field
                    .as_deref()
                    .and_then(<[String]>::first)
                    .is_some_and(|f| f == "cartId")
            });
            if cart_gone {
                return Err(ShopifyError::NotFound(message));
            }
            return Err(ShopifyError::UserError(message));
        }

        if let Some(cart) = result.cart {
            return convert_cart_summary(cart);
        }
    }

    Err(ShopifyError::GraphQL(vec![GraphQLError::message(failure)]))
}

fn convert_graphql_error(error: graphql_client::Error) -> GraphQLError {
    GraphQLError {
        message: error.message,
        locations: error.locations.map_or_else(Vec::new, |locs| {
            locs.into_iter()
                .map(|l| GraphQLErrorLocation {
                    line: i64::from(l.line),
                    column: i64::from(l.column),
                })
                .collect()
        }),
        path: error.path.map_or_else(Vec::new, |p| {
            p.into_iter()
                .map(|fragment| match fragment {
                    graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                    graphql_client::PathFragment::Index(i) => serde_json::Value::Number(i.into()),
                })
                .collect()
        }),
    }
}
