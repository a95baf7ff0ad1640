//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::filters;
use crate::shopify::ShopInfo;
use crate::state::AppState;

use super::products::ProductView;

/// Shop header data.
#[derive(Clone)]
pub struct ShopView {
    pub name: String,
    pub description: Option<String>,
    pub url: String,
}

impl From<ShopInfo> for ShopView {
    fn from(shop: ShopInfo) -> Self {
        Self {
            name: shop.name,
            description: shop.description,
            url: shop.url,
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub shop: Option<ShopView>,
    pub products: Vec<ProductView>,
}

/// Display the home page: shop header plus the first products.
///
/// Both reads run concurrently and fail soft independently.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> HomeTemplate {
    let catalog = state.catalog();
    let (shop, products) = tokio::join!(
        catalog.shop_info(),
        catalog.products(state.config().products_per_page)
    );

    HomeTemplate {
        shop: shop.map(ShopView::from),
        products: products.iter().map(ProductView::from).collect(),
    }
}
