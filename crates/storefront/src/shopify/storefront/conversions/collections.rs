//! Collection type conversion functions.

use shopfront_core::CollectionId;

use crate::shopify::ShopifyError;
use crate::shopify::types::Collection;

use super::super::queries::CollectionNode;
use super::products::convert_products;

/// Validate and convert a collection with its products.
///
/// # Errors
///
/// Returns `ShopifyError::Validation` if any contained product is invalid.
pub fn convert_collection(node: CollectionNode) -> Result<Collection, ShopifyError> {
    let products = convert_products(node.products.nodes)?;

    Ok(Collection {
        id: CollectionId::new(node.id),
        handle: node.handle,
        title: node.title,
        description: node.description.unwrap_or_default(),
        products,
    })
}

/// Convert a list of collections; any invalid collection rejects the list.
///
/// # Errors
///
/// Returns the first validation error encountered.
pub fn convert_collections(nodes: Vec<CollectionNode>) -> Result<Vec<Collection>, ShopifyError> {
    nodes.into_iter().map(convert_collection).collect()
}
