//! Product type conversion functions.

use shopfront_core::{ProductId, VariantId};

use crate::shopify::ShopifyError;
use crate::shopify::types::{Product, ProductVariant};

use super::super::queries::{ProductNode, VariantNode};
use super::{convert_image, convert_money};

/// Validate and convert a product node.
///
/// # Errors
///
/// Returns `ShopifyError::Validation` if the product has no images, no
/// variants, an image with a relative/invalid URL, or an unparseable price.
pub fn convert_product(node: ProductNode) -> Result<Product, ShopifyError> {
    let what = format!("product {}", node.handle);

    if node.images.nodes.is_empty() {
        return Err(ShopifyError::Validation(format!("{what} has no images")));
    }
    if node.variants.nodes.is_empty() {
        return Err(ShopifyError::Validation(format!("{what} has no variants")));
    }

    let images = node
        .images
        .nodes
        .into_iter()
        .map(|image| convert_image(image, &what))
        .collect::<Result<Vec<_>, _>>()?;

    let variants = node
        .variants
        .nodes
        .into_iter()
        .map(|variant| convert_variant(variant, &what))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Product {
        id: ProductId::new(node.id),
        handle: node.handle,
        title: node.title,
        description: node.description.unwrap_or_default(),
        images,
        variants,
    })
}

/// Convert a list of products; any invalid product rejects the list.
///
/// # Errors
///
/// Returns the first validation error encountered.
pub fn convert_products(nodes: Vec<ProductNode>) -> Result<Vec<Product>, ShopifyError> {
    nodes.into_iter().map(convert_product).collect()
}

fn convert_variant(variant: VariantNode, what: &str) -> Result<ProductVariant, ShopifyError> {
    let price = convert_money(&variant.price, what)?;
    Ok(ProductVariant {
        id: VariantId::new(variant.id),
        title: variant.title.unwrap_or_else(|| "Default Title".to_string()),
        price,
    })
}
