//! Cart management on top of the Storefront API.
//!
//! The cart lives in Shopify; the visitor's session only holds its id. Every
//! mutation is followed by a full refetch, so callers always see what Shopify
//! reports rather than a locally patched copy.
//!
//! Lazy cart creation (first add-to-cart) is single-flight per visitor:
//! concurrent requests for the same session await one `cartCreate` call
//! instead of each creating (and orphaning) a cart.

mod session;

pub use session::CartSession;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;
use tracing::{info, instrument, warn};

use shopfront_core::{CartId, CartLineId, Quantity, QuantityChange, QuantityError, VariantId};

use crate::shopify::{Cart, CartLineInput, CartLineUpdateInput, ShopifyError, StorefrontClient};

/// How long a coalesced cart creation result is shared.
const CREATION_TTL: Duration = Duration::from_secs(60);

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The operation needs an existing cart and the session has none.
    #[error("No cart in session")]
    NoCart,

    /// Quantity not allowed for this operation.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// Reading or writing the session failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Shopify call failed.
    #[error(transparent)]
    Shopify(#[from] ShopifyError),

    /// Creating the cart failed (shared by every coalesced caller).
    #[error("Cart creation failed: {0}")]
    Create(Arc<ShopifyError>),
}

impl CartError {
    /// Whether the failure is the caller's fault (bad input or no cart).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NoCart | Self::InvalidQuantity(_) | Self::Shopify(ShopifyError::UserError(_))
        )
    }
}

/// Cart operations bound to a Storefront client.
#[derive(Clone)]
pub struct CartManager {
    client: StorefrontClient,
    creating: Cache<String, CartId>,
}

impl CartManager {
    #[must_use]
    pub fn new(client: StorefrontClient) -> Self {
        let creating = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(CREATION_TTL)
            .build();

        Self { client, creating }
    }

    /// Create a new cart and store its id in the session.
    ///
    /// # Errors
    ///
    /// Returns an error if Shopify rejects the creation or the session fails.
    #[instrument(skip_all)]
    pub async fn create_cart(&self, session: &CartSession) -> Result<Cart, CartError> {
        let cart = self.client.create_cart().await?;
        session.set_cart_id(&cart.id).await?;
        info!(cart_id = %cart.id, "Cart created");
        Ok(cart)
    }

    /// Fetch a cart by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart does not exist or the request fails.
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<Cart, CartError> {
        Ok(self.client.get_cart(cart_id).await?)
    }

    /// The visitor's current cart, if they have one.
    ///
    /// A stored id whose cart no longer exists is cleared from the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason other than the
    /// cart being gone.
    #[instrument(skip_all)]
    pub async fn current_cart(&self, session: &CartSession) -> Result<Option<Cart>, CartError> {
        let Some(cart_id) = session.cart_id().await? else {
            return Ok(None);
        };

        match self.client.get_cart(&cart_id).await {
            Ok(cart) => Ok(Some(cart)),
            Err(e) if e.is_not_found() => {
                warn!(cart_id = %cart_id, "Stored cart no longer exists, clearing");
                self.forget_cart(session).await?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Add `quantity` of a variant, creating the cart first if needed.
    ///
    /// If the stored cart turns out to be gone, it is forgotten and the add is
    /// retried once against a freshly created cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for a zero quantity, otherwise an
    /// error if cart creation, the mutation or the refetch fails.
    #[instrument(skip(self, session), fields(variant_id = %variant_id))]
    pub async fn add_line(
        &self,
        session: &CartSession,
        variant_id: VariantId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        let line = CartLineInput {
            merchandise_id: variant_id,
            quantity: Quantity::try_from(quantity)?,
        };

        let cart_id = self.ensure_cart_id(session).await?;
        match self.add_and_refetch(&cart_id, line.clone()).await {
            Err(e) if e.is_not_found() => {
                warn!(cart_id = %cart_id, "Stored cart no longer exists, starting a new one");
                self.forget_cart(session).await?;
                let cart_id = self.ensure_cart_id(session).await?;
                Ok(self.add_and_refetch(&cart_id, line).await?)
            }
            result => Ok(result?),
        }
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NoCart` if the session has no cart (or its cart is
    /// gone), otherwise an error if the mutation or the refetch fails.
    #[instrument(skip(self, session), fields(line_id = %line_id))]
    pub async fn update_line(
        &self,
        session: &CartSession,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        let quantity = match QuantityChange::from(quantity) {
            QuantityChange::Remove => return self.remove_line(session, line_id).await,
            QuantityChange::Set(quantity) => quantity,
        };

        let cart_id = session.cart_id().await?.ok_or(CartError::NoCart)?;
        let result = async {
            self.client
                .update_cart_lines(
                    &cart_id,
                    vec![CartLineUpdateInput {
                        id: line_id,
                        quantity,
                    }],
                )
                .await?;
            self.client.get_cart(&cart_id).await
        }
        .await;

        self.settle(session, &cart_id, result).await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NoCart` if the session has no cart (or its cart is
    /// gone), otherwise an error if the mutation or the refetch fails.
    #[instrument(skip(self, session), fields(line_id = %line_id))]
    pub async fn remove_line(
        &self,
        session: &CartSession,
        line_id: CartLineId,
    ) -> Result<Cart, CartError> {
        let cart_id = session.cart_id().await?.ok_or(CartError::NoCart)?;
        let result = async {
            self.client.remove_from_cart(&cart_id, vec![line_id]).await?;
            self.client.get_cart(&cart_id).await
        }
        .await;

        self.settle(session, &cart_id, result).await
    }

    async fn add_and_refetch(
        &self,
        cart_id: &CartId,
        line: CartLineInput,
    ) -> Result<Cart, ShopifyError> {
        self.client.add_to_cart(cart_id, vec![line]).await?;
        self.client.get_cart(cart_id).await
    }

    /// Map a mutate-and-refetch result, forgetting a cart that is gone.
    async fn settle(
        &self,
        session: &CartSession,
        cart_id: &CartId,
        result: Result<Cart, ShopifyError>,
    ) -> Result<Cart, CartError> {
        match result {
            Err(e) if e.is_not_found() => {
                warn!(cart_id = %cart_id, "Stored cart no longer exists, clearing");
                self.forget_cart(session).await?;
                Err(CartError::NoCart)
            }
            result => Ok(result?),
        }
    }

    /// The session's cart id, creating a cart (once per visitor) if missing.
    async fn ensure_cart_id(&self, session: &CartSession) -> Result<CartId, CartError> {
        if let Some(cart_id) = session.cart_id().await? {
            return Ok(cart_id);
        }

        let visitor = session.visitor_key().await?;
        let client = self.client.clone();
        let cart_id = self
            .creating
            .try_get_with(visitor, async move {
                let cart = client.create_cart().await?;
                info!(cart_id = %cart.id, "Cart created");
                Ok::<_, ShopifyError>(cart.id)
            })
            .await
            .map_err(CartError::Create)?;

        session.set_cart_id(&cart_id).await?;
        Ok(cart_id)
    }

    /// Drop the stored cart id and any coalesced creation result for it.
    async fn forget_cart(&self, session: &CartSession) -> Result<(), CartError> {
        session.clear_cart_id().await?;
        let visitor = session.visitor_key().await?;
        self.creating.invalidate(&visitor).await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::session::tests::memory_session;
    use super::*;
    use crate::config::ShopifyConfig;

    fn unconfigured() -> CartManager {
        CartManager::new(StorefrontClient::new(&ShopifyConfig::new(
            "http://127.0.0.1:9",
        )))
    }

    #[tokio::test]
    async fn test_add_zero_is_rejected() {
        let carts = unconfigured();
        let session = memory_session();

        let err = carts
            .add_line(&session, VariantId::from_legacy_id(55), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity(QuantityError::Zero)));
        assert!(err.is_client_error());
        // No cart was created
        assert_eq!(session.cart_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_without_cart() {
        let carts = unconfigured();
        let session = memory_session();

        let err = carts
            .update_line(&session, CartLineId::new("gid://shopify/CartLine/1"), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::NoCart));

        // Zero routes to removal, which also needs a cart
        let err = carts
            .update_line(&session, CartLineId::new("gid://shopify/CartLine/1"), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::NoCart));
    }

    #[tokio::test]
    async fn test_current_cart_without_id() {
        let carts = unconfigured();
        assert!(carts.current_cart(&memory_session()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_credential_surfaces_on_write() {
        let carts = unconfigured();
        let session = memory_session();

        let err = carts
            .add_line(&session, VariantId::from_legacy_id(55), 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CartError::Create(ref e) if matches!(**e, ShopifyError::MissingCredential(_))
        ));
        assert!(!err.is_client_error());
    }
}
