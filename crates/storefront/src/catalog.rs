//! Fail-soft catalog reads.
//!
//! Pages must render even when Shopify is down, misconfigured or returns data
//! we cannot validate. Every [`Catalog`] method collapses errors into an empty
//! value and logs them; nothing here returns `Result`.

use tracing::{debug, error, warn};

use crate::shopify::{Collection, Product, ShopInfo, ShopifyError, StorefrontClient};

/// Read-only view of the Shopify catalog.
#[derive(Clone)]
pub struct Catalog {
    client: StorefrontClient,
}

impl Catalog {
    #[must_use]
    pub const fn new(client: StorefrontClient) -> Self {
        Self { client }
    }

    /// Shop metadata, or `None` on any failure.
    pub async fn shop_info(&self) -> Option<ShopInfo> {
        self.client
            .get_shop_info()
            .await
            .map_err(|e| log_failure("shop_info", &e))
            .ok()
    }

    /// The first `first` products, or an empty list on any failure.
    pub async fn products(&self, first: u32) -> Vec<Product> {
        self.client
            .get_products(first)
            .await
            .map_err(|e| log_failure("products", &e))
            .unwrap_or_default()
    }

    /// A single product, or `None` if missing or on any failure.
    pub async fn product(&self, handle: &str) -> Option<Product> {
        self.client
            .get_product_by_handle(handle)
            .await
            .map_err(|e| log_failure("product", &e))
            .ok()
    }

    /// A single collection with its products, or `None`.
    pub async fn collection(&self, handle: &str) -> Option<Collection> {
        self.client
            .get_collection_by_handle(handle)
            .await
            .map_err(|e| log_failure("collection", &e))
            .ok()
    }

    /// All collections, or an empty list on any failure.
    pub async fn collections(&self) -> Vec<Collection> {
        self.client
            .get_collections()
            .await
            .map_err(|e| log_failure("collections", &e))
            .unwrap_or_default()
    }
}

fn log_failure(operation: &'static str, e: &ShopifyError) {
    match e {
        ShopifyError::NotFound(_) => debug!(operation, error = %e, "Catalog item not found"),
        ShopifyError::MissingCredential(_) | ShopifyError::RateLimited(_) => {
            warn!(operation, error = %e, "Catalog read failed");
        }
        _ => error!(operation, error = %e, "Catalog read failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShopifyConfig;

    fn unconfigured() -> Catalog {
        Catalog::new(StorefrontClient::new(&ShopifyConfig::new(
            "http://127.0.0.1:9",
        )))
    }

    #[tokio::test]
    async fn test_missing_credential_fails_soft() {
        let catalog = unconfigured();

        assert!(catalog.shop_info().await.is_none());
        assert!(catalog.products(10).await.is_empty());
        assert!(catalog.product("tee").await.is_none());
        assert!(catalog.collection("frontpage").await.is_none());
        assert!(catalog.collections().await.is_empty());
    }
}
