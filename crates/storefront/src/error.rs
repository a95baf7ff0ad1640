//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. HTML route handlers that can fail return
//! `Result<T, AppError>`. The JSON admin relay uses [`RelayError`], whose
//! bodies follow the relay's `{"error": ..}` contract.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::cart::CartError;
use crate::shopify::{AdminError, ShopifyError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Shopify(_) | Self::Internal(_) => true,
            Self::Cart(err) => !err.is_client_error(),
            Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shopify(ShopifyError::MissingCredential(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Shopify(_) => StatusCode::BAD_GATEWAY,
            Self::Cart(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Cart(CartError::Session(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Cart(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Internal(_) | Self::Cart(CartError::Session(_)) => {
                "Internal server error".to_string()
            }
            Self::Cart(CartError::NoCart) => "Your cart is empty".to_string(),
            Self::Cart(CartError::InvalidQuantity(_)) => {
                "Quantity must be at least 1".to_string()
            }
            Self::Cart(CartError::Shopify(ShopifyError::UserError(msg))) => msg.clone(),
            Self::Shopify(_) | Self::Cart(_) => "External service error".to_string(),
            Self::NotFound(_) | Self::BadRequest(_) => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Errors returned by the `PUT /api/update-product` relay as JSON.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request body or its fields are invalid.
    #[error("{0}")]
    InvalidInput(String),

    /// Shopify answered with a non-success status.
    #[error("Failed to update product")]
    Upstream {
        /// Shopify's status code, passed through.
        status: u16,
        /// Shopify's raw response body.
        details: String,
    },

    /// Missing credential, transport failure or any other internal problem.
    #[error("Something went wrong: {0}")]
    Internal(String),
}

impl From<AdminError> for RelayError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::InvalidInput(msg) => Self::InvalidInput(msg),
            AdminError::Shopify(ShopifyError::Status { status, body }) => Self::Upstream {
                status,
                details: body,
            },
            AdminError::Shopify(other) => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            Self::Upstream { status, details } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                (
                    status,
                    Json(json!({ "error": "Failed to update product", "details": details })),
                )
                    .into_response()
            }
            Self::Internal(_) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Product update relay failed"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Something went wrong" })),
                )
                    .into_response()
            }
        }
    }
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("variant_id", "55")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: impl IntoResponse) -> StatusCode {
        err.into_response().status()
    }

    async fn json_body(err: RelayError) -> serde_json::Value {
        let body = axum::body::to_bytes(err.into_response().into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::NoCart)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Shopify(ShopifyError::MissingCredential("X"))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Shopify(ShopifyError::RateLimited(1))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_relay_upstream_passes_status_and_body() {
        let err = RelayError::from(AdminError::Shopify(ShopifyError::Status {
            status: 422,
            body: r#"{"errors":{"title":["can't be blank"]}}"#.to_string(),
        }));
        assert!(matches!(err, RelayError::Upstream { status: 422, .. }));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Failed to update product");
        assert_eq!(body["details"], r#"{"errors":{"title":["can't be blank"]}}"#);
    }

    #[tokio::test]
    async fn test_relay_internal_hides_details() {
        let err = RelayError::from(AdminError::Shopify(ShopifyError::MissingCredential(
            "SHOPIFY_ADMIN_TOKEN",
        )));
        assert_eq!(
            json_body(err).await,
            serde_json::json!({ "error": "Something went wrong" })
        );
    }

    #[tokio::test]
    async fn test_relay_invalid_input() {
        let err = RelayError::from(AdminError::InvalidInput("Nothing to update".to_string()));
        assert_eq!(
            json_body(err).await,
            serde_json::json!({ "error": "Nothing to update" })
        );
    }
}
