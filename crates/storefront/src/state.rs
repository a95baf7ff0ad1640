//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::CartManager;
use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::shopify::{AdminClient, StorefrontClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The Shopify clients are built
/// once here and share their connection pools.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    carts: CartManager,
    admin: AdminClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Never fails: missing Shopify credentials only make the affected calls
    /// fail later.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let storefront = StorefrontClient::new(&config.shopify);
        let admin = AdminClient::new(&config.shopify);

        Self {
            inner: Arc::new(AppStateInner {
                catalog: Catalog::new(storefront.clone()),
                carts: CartManager::new(storefront),
                admin,
                config,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Fail-soft catalog reads.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Cart operations.
    #[must_use]
    pub fn carts(&self) -> &CartManager {
        &self.inner.carts
    }

    /// Get a reference to the Shopify Admin API client.
    #[must_use]
    pub fn admin(&self) -> &AdminClient {
        &self.inner.admin
    }
}
