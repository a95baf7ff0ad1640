//! Product update routes backed by the Admin API.
//!
//! `PUT /api/update-product` is the same-origin JSON relay: the browser never
//! sees the Admin token, it only talks to this server. The edit page drives the
//! same [`AdminClient`](crate::shopify::AdminClient) through a plain form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, RelayError, add_breadcrumb};
use crate::filters;
use crate::shopify::{AdminError, Product, ProductUpdate};
use crate::state::AppState;

// =============================================================================
// JSON relay
// =============================================================================

/// Product id as sent by clients: a GID string or a bare number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawProductId {
    Text(String),
    Number(u64),
}

impl RawProductId {
    fn into_string(self) -> String {
        match self {
            Self::Text(id) => id,
            Self::Number(id) => id.to_string(),
        }
    }
}

/// Body of `PUT /api/update-product`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub product_id: RawProductId,
    #[serde(default)]
    pub updated_data: ProductUpdate,
}

/// Relay a product update to the Admin API.
///
/// Answers with Shopify's JSON on success; see [`RelayError`] for failures.
#[instrument(skip(state, body))]
pub async fn update_product(
    State(state): State<AppState>,
    body: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, RelayError> {
    let Json(request) = body.map_err(|e| {
        tracing::debug!(error = %e, "Rejected relay body");
        RelayError::InvalidInput("Invalid request body".to_string())
    })?;

    let product_id = request.product_id.into_string();
    add_breadcrumb("admin", "Relay product update", Some(&[("product_id", product_id.as_str())]));

    let updated = state
        .admin()
        .update_product(&product_id, &request.updated_data)
        .await?;

    Ok(Json(updated))
}

// =============================================================================
// Edit page
// =============================================================================

/// Product edit form fields.
#[derive(Debug, Deserialize)]
pub struct EditProductForm {
    pub product_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: String,
}

/// Product edit page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/edit.html")]
pub struct EditProductTemplate {
    pub handle: String,
    pub product_id: String,
    pub title: String,
    pub price: String,
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl EditProductTemplate {
    fn for_product(product: &Product) -> Self {
        Self {
            handle: product.handle.clone(),
            product_id: product.id.to_string(),
            title: product.title.clone(),
            price: product
                .price()
                .map(|price| price.amount.to_string())
                .unwrap_or_default(),
            notice: None,
            error: None,
        }
    }
}

/// Display the edit form for a product.
#[instrument(skip(state), fields(handle = %handle))]
pub async fn edit_page(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<EditProductTemplate, AppError> {
    let product = state
        .catalog()
        .product(&handle)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {handle}")))?;

    Ok(EditProductTemplate::for_product(&product))
}

/// Submit the edit form and re-render it with the outcome.
#[instrument(skip(state, form), fields(handle = %handle))]
pub async fn edit_submit(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Form(form): Form<EditProductForm>,
) -> Response {
    let update = ProductUpdate {
        title: Some(form.title.clone()),
        price: Some(form.price.clone()),
    };

    let result = state.admin().update_product(&form.product_id, &update).await;

    let mut page = EditProductTemplate {
        handle,
        product_id: form.product_id,
        title: form.title,
        price: form.price,
        notice: None,
        error: None,
    };

    match result {
        Ok(_) => {
            page.notice = Some("Product updated".to_string());
            page.into_response()
        }
        Err(AdminError::InvalidInput(msg)) => {
            page.error = Some(msg);
            (StatusCode::BAD_REQUEST, page).into_response()
        }
        Err(AdminError::Shopify(e)) => {
            tracing::error!(error = %e, "Product update failed");
            page.error = Some("Failed to update product".to_string());
            (StatusCode::BAD_GATEWAY, page).into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_numeric_and_gid_ids() {
        let request: UpdateProductRequest = serde_json::from_value(serde_json::json!({
            "productId": 123,
            "updatedData": { "title": "New" }
        }))
        .unwrap();
        assert_eq!(request.product_id.into_string(), "123");
        assert_eq!(request.updated_data.title.as_deref(), Some("New"));
        assert_eq!(request.updated_data.price, None);

        let request: UpdateProductRequest = serde_json::from_value(serde_json::json!({
            "productId": "gid://shopify/Product/123"
        }))
        .unwrap();
        assert_eq!(request.product_id.into_string(), "gid://shopify/Product/123");
        assert!(request.updated_data.is_empty());
    }
}
