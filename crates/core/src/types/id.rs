//! Newtype IDs for Shopify global identifiers.
//!
//! Shopify identifies every object with a global ID of the form
//! `gid://shopify/<Resource>/<id>`, optionally followed by a query string
//! (carts carry `?key=...`). Use the `define_gid!` macro to create type-safe
//! wrappers that prevent accidentally passing a line ID where a variant ID is
//! expected.

/// Prefix shared by every Shopify global ID.
pub const GID_PREFIX: &str = "gid://shopify/";

/// Macro to define a type-safe Shopify global ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `new()`, `as_str()`, `into_inner()`, `tail()`, `legacy_id()`
/// - `from_legacy_id()` to build a full GID from a numeric ID
/// - `Display`, `AsRef<str>` and `From<String>` implementations
///
/// # Example
///
/// ```rust
/// # use shopfront_core::define_gid;
/// define_gid!(OrderId, "Order");
///
/// let id = OrderId::new("gid://shopify/Order/42");
/// assert_eq!(id.legacy_id(), Some(42));
/// assert_eq!(OrderId::from_legacy_id(42), id);
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident, $resource:literal) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Shopify resource name used in the GID path.
            pub const RESOURCE: &'static str = $resource;

            /// Wrap a raw ID string.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Build a full GID from a numeric (REST) ID.
            #[must_use]
            pub fn from_legacy_id(id: u64) -> Self {
                Self(format!("{}{}/{}", $crate::types::id::GID_PREFIX, $resource, id))
            }

            /// Get the raw ID string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the raw ID string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Last path segment of the ID, without any query string.
            #[must_use]
            pub fn tail(&self) -> &str {
                $crate::types::id::gid_tail(&self.0)
            }

            /// Numeric ID used by the REST Admin API, if the tail is numeric.
            #[must_use]
            pub fn legacy_id(&self) -> Option<u64> {
                self.tail().parse().ok()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Return the last path segment of a GID (or of a bare ID), dropping any
/// `?query` suffix.
///
/// `gid://shopify/Cart/c1-abc?key=xyz` -> `c1-abc`, `123` -> `123`.
#[must_use]
pub fn gid_tail(id: &str) -> &str {
    let without_query = id.split_once('?').map_or(id, |(path, _)| path);
    without_query
        .rsplit_once('/')
        .map_or(without_query, |(_, tail)| tail)
}

define_gid!(ShopId, "Shop");
define_gid!(ProductId, "Product");
define_gid!(VariantId, "ProductVariant");
define_gid!(CollectionId, "Collection");
define_gid!(CartId, "Cart");
define_gid!(CartLineId, "CartLine");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gid_tail_strips_path_and_query() {
        assert_eq!(gid_tail("gid://shopify/Product/123"), "123");
        assert_eq!(gid_tail("gid://shopify/Cart/c1-abc?key=xyz"), "c1-abc");
        assert_eq!(gid_tail("456"), "456");
        assert_eq!(gid_tail(""), "");
    }

    #[test]
    fn test_legacy_id() {
        assert_eq!(ProductId::new("gid://shopify/Product/8").legacy_id(), Some(8));
        assert_eq!(ProductId::new("8").legacy_id(), Some(8));
        assert_eq!(CartId::new("gid://shopify/Cart/c1-abc").legacy_id(), None);
    }

    #[test]
    fn test_from_legacy_id() {
        let id = VariantId::from_legacy_id(55);
        assert_eq!(id.as_str(), "gid://shopify/ProductVariant/55");
        assert_eq!(VariantId::RESOURCE, "ProductVariant");
    }

    #[test]
    fn test_serde_transparent() {
        let id = CartLineId::new("gid://shopify/CartLine/1?cart=c1");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"gid://shopify/CartLine/1?cart=c1\"");
    }
}
