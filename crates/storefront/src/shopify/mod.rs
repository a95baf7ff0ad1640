//! Shopify Storefront and Admin API clients.
//!
//! # Architecture
//!
//! - `graphql_client` request/response envelopes for Storefront API operations
//! - Shopify is source of truth - NO local sync, NO response caching
//! - Every response is parsed into typed payloads, validated, then mapped to
//!   the domain types in [`types`]
//!
//! # APIs
//!
//! ## Storefront API (GraphQL)
//! - Shop info, products, collections (read)
//! - Cart create / read / add / update / remove
//!
//! ## Admin API (REST)
//! - Product title/price update, used only by the server-side relay
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::shopify::StorefrontClient;
//!
//! let client = StorefrontClient::new(&config.shopify);
//!
//! let product = client.get_product_by_handle("my-product").await?;
//! let cart = client.create_cart().await?;
//! client.add_to_cart(&cart.id, vec![CartLineInput {
//!     merchandise_id: product.variants[0].id.clone(),
//!     quantity: Quantity::ONE,
//! }]).await?;
//! let cart = client.get_cart(&cart.id).await?;
//! ```

pub mod admin;
mod storefront;
pub mod types;

pub use admin::{AdminClient, AdminError, ProductUpdate};
pub use storefront::StorefrontClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with Shopify APIs.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response parsed but violates the expected shape.
    #[error("Invalid response: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),

    /// The credential needed for this call is not configured.
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
}

impl ShopifyError {
    /// Whether this error means the requested object does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    /// An error carrying only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }
    }
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Truncate an upstream body for logs and error messages.
pub(crate) fn truncate_body(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shopify_error_display() {
        let err = ShopifyError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_graphql_error_formatting() {
        let errors = vec![
            GraphQLError::message("Field not found"),
            GraphQLError::message("Invalid ID"),
        ];
        let err = ShopifyError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_graphql_error_path_and_location() {
        let errors = vec![GraphQLError {
            message: String::new(),
            locations: vec![GraphQLErrorLocation { line: 5, column: 10 }],
            path: vec![
                serde_json::Value::String("cartLinesAdd".to_string()),
                serde_json::Value::Number(0.into()),
            ],
        }];
        let err = ShopifyError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: path: cartLinesAdd.0 at line 5:10"
        );
    }

    #[test]
    fn test_graphql_error_no_details() {
        let err = ShopifyError::GraphQL(vec![GraphQLError::message("")]);
        assert_eq!(err.to_string(), "GraphQL errors: [error 1]: (no details)");
        let err = ShopifyError::GraphQL(vec![]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: (no error details provided)"
        );
    }

    #[test]
    fn test_status_and_credential_errors() {
        let err = ShopifyError::Status {
            status: 401,
            body: "Unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401: Unauthorized");
        let err = ShopifyError::MissingCredential("SHOPIFY_ADMIN_TOKEN");
        assert_eq!(err.to_string(), "Missing credential: SHOPIFY_ADMIN_TOKEN");
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("héllo world", 5), "héllo");
        assert_eq!(truncate_body("ok", 500), "ok");
    }
}
