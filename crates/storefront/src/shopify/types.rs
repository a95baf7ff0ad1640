//! Domain types for Shopify Storefront API.
//!
//! These types provide a clean, validated API separate from the raw payloads
//! parsed in `storefront::queries`. Everything here has passed the checks in
//! `storefront::conversions`.

use serde::{Deserialize, Serialize};
use shopfront_core::{
    CartId, CartLineId, CollectionId, Price, ProductId, Quantity, ShopId, VariantId,
};

// =============================================================================
// Shop
// =============================================================================

/// Shop metadata shown in the storefront header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopInfo {
    pub id: ShopId,
    pub name: String,
    pub description: Option<String>,
    /// Primary domain URL of the hosted shop.
    pub url: String,
}

// =============================================================================
// Image Types
// =============================================================================

/// Product or merchandise image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Absolute image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

// =============================================================================
// Product Types
// =============================================================================

/// A purchasable configuration of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    /// Variant title ("Default Title" for single-variant products).
    pub title: String,
    pub price: Price,
}

/// A product snapshot. Always has at least one image and one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub handle: String,
    pub title: String,
    /// Plain-text description (empty when the query did not request it).
    pub description: String,
    pub images: Vec<Image>,
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// First image, used as the product card image.
    #[must_use]
    pub fn featured_image(&self) -> Option<&Image> {
        self.images.first()
    }

    /// First variant, used for the card price and default add-to-cart.
    #[must_use]
    pub fn default_variant(&self) -> Option<&ProductVariant> {
        self.variants.first()
    }

    /// Display price of the default variant.
    #[must_use]
    pub fn price(&self) -> Option<&Price> {
        self.default_variant().map(|v| &v.price)
    }
}

// =============================================================================
// Collection Types
// =============================================================================

/// A curated group of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub handle: String,
    pub title: String,
    pub description: String,
    pub products: Vec<Product>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// A cart as last reported by Shopify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    /// Hosted checkout URL for this cart.
    pub checkout_url: String,
    /// Sum of line quantities, computed by Shopify.
    pub total_quantity: u32,
    /// Estimated total, if Shopify reported one.
    pub total: Option<Price>,
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Find a line by ID.
    #[must_use]
    pub fn line(&self, id: &CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == id)
    }
}

/// One variant/quantity pair within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub quantity: Quantity,
    pub merchandise: CartMerchandise,
}

/// The variant a cart line refers to, with its parent product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMerchandise {
    pub id: VariantId,
    pub title: String,
    pub product_title: String,
    pub product_handle: String,
    pub image: Option<Image>,
    /// Unit price, if Shopify reported one.
    pub price: Option<Price>,
}

/// What a cart mutation reports back. Callers refetch the full cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    pub id: CartId,
    pub total_quantity: u32,
}

/// Input for adding a line to a cart.
#[derive(Debug, Clone)]
pub struct CartLineInput {
    /// Variant to add.
    pub merchandise_id: VariantId,
    /// Units to add.
    pub quantity: Quantity,
}

/// Input for changing the quantity of an existing line.
#[derive(Debug, Clone)]
pub struct CartLineUpdateInput {
    /// Line to update.
    pub id: CartLineId,
    /// New quantity.
    pub quantity: Quantity,
}
