//! Validate-then-map conversions for Shopify Storefront API responses.
//!
//! Raw payloads from `queries` are already structurally typed by serde. These
//! functions add the semantic checks (absolute URLs, decimal prices, non-zero
//! quantities, at least one image and variant per product) and map into
//! `shopify::types`. A single failure rejects the whole response.

pub mod cart;
pub mod collections;
pub mod products;
pub mod shop;

pub use cart::{convert_cart, convert_cart_summary, user_errors_message};
pub use collections::{convert_collection, convert_collections};
pub use products::{convert_product, convert_products};
pub use shop::convert_shop;

use shopfront_core::Price;

use crate::shopify::ShopifyError;
use crate::shopify::types::Image;

use super::queries::{ImageNode, MoneyV2};

/// Require an absolute URL.
fn validate_url(url: &str, what: &str) -> Result<(), ShopifyError> {
    url::Url::parse(url)
        .map(|_| ())
        .map_err(|e| ShopifyError::Validation(format!("{what} has invalid URL {url:?}: {e}")))
}

fn convert_image(image: ImageNode, what: &str) -> Result<Image, ShopifyError> {
    validate_url(&image.url, what)?;
    Ok(Image {
        url: image.url,
        alt_text: image.alt_text.filter(|alt| !alt.is_empty()),
    })
}

fn convert_money(money: &MoneyV2, what: &str) -> Result<Price, ShopifyError> {
    Price::parse(&money.amount, &money.currency_code)
        .map_err(|e| ShopifyError::Validation(format!("{what}: {e}")))
}
