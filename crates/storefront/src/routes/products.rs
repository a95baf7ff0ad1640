//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::Price;

use crate::cart::CartSession;
use crate::error::AppError;
use crate::filters;
use crate::routes::cart::establish_visitor;
use crate::shopify::{Image, Product};
use crate::state::AppState;

/// Largest `first` accepted by the listing page.
pub const MAX_PRODUCTS_PER_PAGE: u32 = 50;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub handle: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub featured_image: Option<ImageView>,
    pub images: Vec<ImageView>,
    pub variants: Vec<VariantView>,
}

impl ProductView {
    /// Id of the variant added to the cart when none is chosen.
    #[must_use]
    pub fn default_variant_id(&self) -> &str {
        self.variants.first().map_or("", |v| v.id.as_str())
    }

    /// Whether the variant picker is worth showing.
    #[must_use]
    pub fn has_variant_choice(&self) -> bool {
        self.variants.len() > 1
    }
}

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

/// Variant display data for templates.
#[derive(Clone)]
pub struct VariantView {
    pub id: String,
    pub title: String,
    pub price: String,
}

impl ImageView {
    fn from_image(image: &Image, fallback_alt: &str) -> Self {
        Self {
            url: image.url.clone(),
            alt: image
                .alt_text
                .clone()
                .unwrap_or_else(|| fallback_alt.to_string()),
        }
    }
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            description: product.description.clone(),
            price: Price::display_or_dash(product.price()),
            featured_image: product
                .featured_image()
                .map(|image| ImageView::from_image(image, &product.title)),
            images: product
                .images
                .iter()
                .map(|image| ImageView::from_image(image, &product.title))
                .collect(),
            variants: product
                .variants
                .iter()
                .map(|variant| VariantView {
                    id: variant.id.to_string(),
                    title: variant.title.clone(),
                    price: variant.price.display(),
                })
                .collect(),
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub first: Option<u32>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductView>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
}

/// Clamp the requested page size to `1..=MAX_PRODUCTS_PER_PAGE`.
#[must_use]
pub fn page_size(requested: Option<u32>, default: u32) -> u32 {
    requested
        .unwrap_or(default)
        .clamp(1, MAX_PRODUCTS_PER_PAGE)
}

/// Display product listing page.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> ProductsIndexTemplate {
    let first = page_size(query.first, state.config().products_per_page);
    let products = state.catalog().products(first).await;

    ProductsIndexTemplate {
        products: products.iter().map(ProductView::from).collect(),
    }
}

/// Display product detail page.
#[instrument(skip(state, session), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    session: CartSession,
    Path(handle): Path<String>,
) -> Result<ProductShowTemplate, AppError> {
    establish_visitor(&session).await;
    let product = state
        .catalog()
        .product(&handle)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {handle}")))?;

    Ok(ProductShowTemplate {
        product: ProductView::from(&product),
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use shopfront_core::{CurrencyCode, ProductId, VariantId};

    use super::*;
    use crate::shopify::ProductVariant;

    fn product() -> Product {
        Product {
            id: ProductId::from_legacy_id(1),
            handle: "tee".to_string(),
            title: "Tee".to_string(),
            description: String::new(),
            images: vec![Image {
                url: "https://cdn.shopify.com/tee.png".to_string(),
                alt_text: None,
            }],
            variants: vec![ProductVariant {
                id: VariantId::from_legacy_id(55),
                title: "Default Title".to_string(),
                price: Price::new(Decimal::new(2500, 2), CurrencyCode::USD),
            }],
        }
    }

    #[test]
    fn test_product_view() {
        let view = ProductView::from(&product());
        assert_eq!(view.price, "$25.00");
        assert_eq!(view.default_variant_id(), "gid://shopify/ProductVariant/55");
        assert!(!view.has_variant_choice());
        // Alt text falls back to the product title
        assert_eq!(view.featured_image.map(|i| i.alt).as_deref(), Some("Tee"));
    }

    #[test]
    fn test_page_size_is_clamped() {
        assert_eq!(page_size(None, 10), 10);
        assert_eq!(page_size(Some(0), 10), 1);
        assert_eq!(page_size(Some(500), 10), MAX_PRODUCTS_PER_PAGE);
    }
}
