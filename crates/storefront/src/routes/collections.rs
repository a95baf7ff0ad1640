//! Collection route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::shopify::Collection;
use crate::state::AppState;

pub use super::products::ProductView;

/// Products shown per collection on the listing page.
const PREVIEW_PRODUCTS: usize = 4;

/// Collection display data for templates.
#[derive(Clone)]
pub struct CollectionView {
    pub handle: String,
    pub title: String,
    pub description: Option<String>,
    pub products: Vec<ProductView>,
}

impl CollectionView {
    /// The first few products, for listing previews.
    #[must_use]
    pub fn preview(&self) -> &[ProductView] {
        self.products
            .get(..PREVIEW_PRODUCTS)
            .unwrap_or(&self.products)
    }
}

impl From<&Collection> for CollectionView {
    fn from(collection: &Collection) -> Self {
        Self {
            handle: collection.handle.clone(),
            title: collection.title.clone(),
            description: Some(collection.description.clone()).filter(|d| !d.is_empty()),
            products: collection.products.iter().map(ProductView::from).collect(),
        }
    }
}

/// Collection listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/index.html")]
pub struct CollectionsIndexTemplate {
    pub collections: Vec<CollectionView>,
}

/// Collection detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/show.html")]
pub struct CollectionShowTemplate {
    pub collection: CollectionView,
}

/// Display all collections.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> CollectionsIndexTemplate {
    let collections = state.catalog().collections().await;

    CollectionsIndexTemplate {
        collections: collections.iter().map(CollectionView::from).collect(),
    }
}

/// Display a collection and its products.
#[instrument(skip(state), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<CollectionShowTemplate, AppError> {
    let collection = state
        .catalog()
        .collection(&handle)
        .await
        .ok_or_else(|| AppError::NotFound(format!("collection {handle}")))?;

    Ok(CollectionShowTemplate {
        collection: CollectionView::from(&collection),
    })
}

#[cfg(test)]
mod tests {
    use shopfront_core::CollectionId;

    use super::*;

    #[test]
    fn test_empty_description_is_hidden() {
        let view = CollectionView::from(&Collection {
            id: CollectionId::from_legacy_id(9),
            handle: "frontpage".to_string(),
            title: "Home page".to_string(),
            description: String::new(),
            products: vec![],
        });
        assert_eq!(view.description, None);
        assert!(view.preview().is_empty());
    }
}
