//! Cart type conversion functions.

use shopfront_core::{CartId, CartLineId, Quantity, VariantId};

use crate::shopify::ShopifyError;
use crate::shopify::types::{Cart, CartLine, CartMerchandise, CartSummary};

use super::super::queries::{CartLineNode, CartNode, CartSummaryNode, UserErrorNode};
use super::{convert_image, convert_money, validate_url};

/// Validate and convert a full cart.
///
/// # Errors
///
/// Returns `ShopifyError::Validation` for a line quantity below 1, a negative
/// total quantity, an invalid checkout/image URL or an unparseable price.
pub fn convert_cart(node: CartNode) -> Result<Cart, ShopifyError> {
    validate_url(&node.checkout_url, "cart checkout")?;

    let total_quantity = convert_total_quantity(node.total_quantity)?;
    let total = node
        .cost
        .map(|cost| convert_money(&cost.total_amount, "cart total"))
        .transpose()?;

    let lines = node
        .lines
        .edges
        .into_iter()
        .map(|edge| convert_cart_line(edge.node))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Cart {
        id: CartId::new(node.id),
        checkout_url: node.checkout_url,
        total_quantity,
        total,
        lines,
    })
}

/// Convert the cart fields returned by a line mutation.
///
/// # Errors
///
/// Returns `ShopifyError::Validation` for a negative total quantity.
pub fn convert_cart_summary(node: CartSummaryNode) -> Result<CartSummary, ShopifyError> {
    Ok(CartSummary {
        id: CartId::new(node.id),
        total_quantity: convert_total_quantity(node.total_quantity)?,
    })
}

/// Join mutation user errors into one message, or `None` if there are none.
#[must_use]
pub fn user_errors_message(errors: &[UserErrorNode]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }

    Some(
        errors
            .iter()
            .map(|e| match &e.field {
                Some(field) if !field.is_empty() => format!("{}: {}", field.join("."), e.message),
                _ => e.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; "),
    )
}

fn convert_total_quantity(total: i64) -> Result<u32, ShopifyError> {
    u32::try_from(total)
        .map_err(|_| ShopifyError::Validation(format!("cart total quantity {total} out of range")))
}

fn convert_cart_line(line: CartLineNode) -> Result<CartLine, ShopifyError> {
    let quantity = Quantity::try_from(line.quantity)
        .map_err(|e| ShopifyError::Validation(format!("cart line {}: {e}", line.id)))?;

    let merchandise = line.merchandise;
    let what = format!("cart line {}", line.id);
    let image = merchandise
        .image
        .map(|image| convert_image(image, &what))
        .transpose()?;
    let price = merchandise
        .price
        .as_ref()
        .map(|price| convert_money(price, &what))
        .transpose()?;

    Ok(CartLine {
        id: CartLineId::new(line.id),
        quantity,
        merchandise: CartMerchandise {
            id: VariantId::new(merchandise.id),
            title: merchandise.title,
            product_title: merchandise.product.title,
            product_handle: merchandise.product.handle,
            image,
            price,
        },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn cart_json(lines: serde_json::Value, total_quantity: i64) -> CartNode {
        serde_json::from_value(json!({
            "id": "gid://shopify/Cart/c1?key=k",
            "checkoutUrl": "https://shop.test/cart/c/c1?key=k",
            "totalQuantity": total_quantity,
            "cost": { "totalAmount": { "amount": "50.0", "currencyCode": "EUR" } },
            "lines": { "edges": lines }
        }))
        .unwrap()
    }

    fn line(quantity: i64) -> serde_json::Value {
        json!({ "node": {
            "id": "gid://shopify/CartLine/1?cart=c1",
            "quantity": quantity,
            "merchandise": {
                "id": "gid://shopify/ProductVariant/55",
                "title": "Default Title",
                "product": { "title": "Tee", "handle": "tee" },
                "image": { "url": "https://cdn.shopify.com/tee.png", "altText": null },
                "price": { "amount": "25.00", "currencyCode": "EUR" }
            }
        }})
    }

    #[test]
    fn test_convert_cart_with_line() {
        let cart = convert_cart(cart_json(json!([line(2)]), 2)).unwrap();
        assert_eq!(cart.total_quantity, 2);
        assert_eq!(cart.total.as_ref().map(|p| p.display()).as_deref(), Some("€50.00"));
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity.get(), 2);
        assert_eq!(cart.lines[0].merchandise.product_handle, "tee");
    }

    #[test]
    fn test_convert_empty_cart() {
        let cart = convert_cart(cart_json(json!([]), 0)).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity, 0);
    }

    #[test]
    fn test_rejects_zero_quantity_line() {
        let err = convert_cart(cart_json(json!([line(0)]), 0)).unwrap_err();
        assert!(matches!(err, ShopifyError::Validation(_)));
    }

    #[test]
    fn test_rejects_negative_total() {
        assert!(convert_cart(cart_json(json!([]), -1)).is_err());
    }

    #[test]
    fn test_user_errors_message() {
        assert_eq!(user_errors_message(&[]), None);

        let errors = vec![
            UserErrorNode {
                field: Some(vec!["lines".to_string(), "0".to_string()]),
                message: "Merchandise does not exist".to_string(),
            },
            UserErrorNode {
                field: None,
                message: "Cart is locked".to_string(),
            },
        ];
        assert_eq!(
            user_errors_message(&errors).as_deref(),
            Some("lines.0: Merchandise does not exist; Cart is locked")
        );
    }
}
