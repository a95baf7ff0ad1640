//! Shopify Admin REST API client.
//!
//! Only one operation is exposed: updating a product's title and/or the price
//! of its first variant. The Admin token never leaves this module; browsers
//! reach it through the same-origin relay in `routes::admin`.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use shopfront_core::{ProductId, parse_amount};

use crate::config::ShopifyConfig;
use crate::shopify::{ShopifyError, truncate_body};

/// Header carrying the Admin API access token.
const ADMIN_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Errors from an Admin product update.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The caller's input cannot produce a valid update.
    #[error("{0}")]
    InvalidInput(String),

    /// The request to Shopify failed or Shopify rejected it.
    #[error(transparent)]
    Shopify(#[from] ShopifyError),
}

/// Requested product changes. Blank fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
}

impl ProductUpdate {
    /// Trimmed, non-empty title.
    fn title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Trimmed, non-empty price.
    fn price(&self) -> Option<&str> {
        self.price.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    /// Whether there is anything to send.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title().is_none() && self.price().is_none()
    }
}

#[derive(Debug, Serialize)]
struct ProductUpdateBody<'a> {
    product: ProductUpdatePayload<'a>,
}

#[derive(Debug, Serialize)]
struct ProductUpdatePayload<'a> {
    id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variants: Option<[VariantPricePayload<'a>; 1]>,
}

#[derive(Debug, Serialize)]
struct VariantPricePayload<'a> {
    price: &'a str,
}

/// Normalize a numeric or `gid://shopify/Product/<n>` id to the numeric id.
///
/// # Errors
///
/// Returns `AdminError::InvalidInput` if the id is blank or has no numeric tail.
pub fn normalize_product_id(raw: &str) -> Result<u64, AdminError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AdminError::InvalidInput("Product ID is required".to_string()));
    }

    ProductId::new(raw)
        .legacy_id()
        .ok_or_else(|| AdminError::InvalidInput(format!("Invalid product ID: {raw}")))
}

/// Build the REST request body, validating the update.
fn build_body(product_id: u64, update: &ProductUpdate) -> Result<ProductUpdateBody<'_>, AdminError> {
    if update.is_empty() {
        return Err(AdminError::InvalidInput("Nothing to update".to_string()));
    }

    let price = update.price();
    if let Some(price) = price {
        parse_amount(price).map_err(|e| AdminError::InvalidInput(format!("Invalid price: {e}")))?;
    }

    Ok(ProductUpdateBody {
        product: ProductUpdatePayload {
            id: product_id,
            title: update.title(),
            variants: price.map(|price| [VariantPricePayload { price }]),
        },
    })
}

/// Client for the Shopify Admin REST API.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    config: ShopifyConfig,
    access_token: Option<SecretString>,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// A missing token is not an error here; updates then fail with
    /// [`ShopifyError::MissingCredential`].
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
            inner: Arc::new(AdminClientInner {
                client,
                config: config.clone(),
                access_token: config.admin_token.clone(),
            }),
        }
    }

    /// Update a product's title and/or first-variant price.
    ///
    /// Returns Shopify's JSON response on success.
    ///
    /// # Errors
    ///
    /// - `AdminError::InvalidInput` for a bad id, an empty update or a bad price
    /// - `ShopifyError::MissingCredential` when no Admin token is configured
    /// - `ShopifyError::Status` carrying Shopify's full body on a non-2xx answer
    /// - `ShopifyError::Http`/`Parse` for transport or decoding failures
    #[instrument(skip(self, update), fields(product_id = %product_id))]
    pub async fn update_product(
        &self,
        product_id: &str,
        update: &ProductUpdate,
    ) -> Result<serde_json::Value, AdminError> {
        let numeric_id = normalize_product_id(product_id)?;
        let body = build_body(numeric_id, update)?;

        let token = self
            .inner
            .access_token
            .as_ref()
            .ok_or(ShopifyError::MissingCredential("SHOPIFY_ADMIN_TOKEN"))?;

        let response = self
            .inner
            .client
            .put(self.inner.config.admin_product_url(numeric_id))
            .header(ADMIN_TOKEN_HEADER, token.expose_secret())
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(ShopifyError::from)?;

        let status = response.status();
        let response_text = response.text().await.map_err(ShopifyError::from)?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate_body(&response_text, 500),
                "Shopify Admin API rejected product update"
            );
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                body: response_text,
            }
            .into());
        }

        tracing::info!(product_id = numeric_id, "Product updated");
        serde_json::from_str(&response_text).map_err(|e| ShopifyError::Parse(e).into())
    }
}
