//! Per-visitor cart context stored in the session.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use shopfront_core::CartId;

/// Session keys used by the cart.
mod keys {
    /// Key for storing the Shopify cart ID.
    pub const CART_ID: &str = "cart_id";

    /// Key for the stable visitor key used to coalesce cart creation.
    pub const VISITOR_KEY: &str = "visitor_key";
}

/// The cart pointer of one visitor.
///
/// Every cart operation takes one of these explicitly; there is no ambient
/// "current cart". Clones share the same underlying session.
#[derive(Clone, Debug)]
pub struct CartSession {
    session: Session,
}

impl CartSession {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// The stored cart id, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn cart_id(&self) -> Result<Option<CartId>, tower_sessions::session::Error> {
        self.session.get::<CartId>(keys::CART_ID).await
    }

    /// Remember `cart_id` for this visitor.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn set_cart_id(&self, cart_id: &CartId) -> Result<(), tower_sessions::session::Error> {
        self.session.insert(keys::CART_ID, cart_id).await
    }

    /// Forget the stored cart id.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn clear_cart_id(&self) -> Result<(), tower_sessions::session::Error> {
        self.session.remove::<CartId>(keys::CART_ID).await.map(|_| ())
    }

    /// A key identifying this visitor, stable across concurrent requests.
    ///
    /// Derived from the session id, so the session is persisted first when it
    /// is brand new. Requests sharing a session cookie get the same key.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn visitor_key(&self) -> Result<String, tower_sessions::session::Error> {
        if let Some(key) = self.session.get::<String>(keys::VISITOR_KEY).await? {
            return Ok(key);
        }

        if self.session.id().is_none() {
            self.session.save().await?;
        }

        let key = self
            .session
            .id()
            .map_or_else(|| uuid::Uuid::new_v4().to_string(), |id| id.to_string());
        self.session.insert(keys::VISITOR_KEY, &key).await?;
        Ok(key)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CartSession {
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(Self::new)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    /// A fresh, unsaved session backed by a throwaway memory store.
    pub(crate) fn memory_session() -> CartSession {
        CartSession::new(Session::new(None, Arc::new(MemoryStore::default()), None))
    }

    #[tokio::test]
    async fn test_cart_id_round_trip() {
        let session = memory_session();
        assert_eq!(session.cart_id().await.unwrap(), None);

        let id = CartId::new("gid://shopify/Cart/c1?key=k");
        session.set_cart_id(&id).await.unwrap();
        assert_eq!(session.cart_id().await.unwrap(), Some(id));

        session.clear_cart_id().await.unwrap();
        assert_eq!(session.cart_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_visitor_key_is_stable() {
        let session = memory_session();
        let first = session.visitor_key().await.unwrap();
        let second = session.visitor_key().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_concurrent_visitor_keys_agree() {
        let session = memory_session();
        let other = session.clone();
        let (a, b) = tokio::join!(session.visitor_key(), other.visitor_key());
        assert_eq!(a.unwrap(), b.unwrap());
    }
}
