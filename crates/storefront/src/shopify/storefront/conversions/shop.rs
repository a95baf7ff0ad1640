//! Shop info conversion.

use shopfront_core::ShopId;

use crate::shopify::ShopifyError;
use crate::shopify::types::ShopInfo;

use super::super::queries::get_shop;
use super::validate_url;

/// Validate and convert shop metadata.
///
/// # Errors
///
/// Returns `ShopifyError::Validation` if the primary domain URL is invalid.
pub fn convert_shop(shop: get_shop::Shop) -> Result<ShopInfo, ShopifyError> {
    validate_url(&shop.primary_domain.url, "shop primary domain")?;

    Ok(ShopInfo {
        id: ShopId::new(shop.id),
        name: shop.name,
        description: shop.description.filter(|d| !d.trim().is_empty()),
        url: shop.primary_domain.url,
    })
}
