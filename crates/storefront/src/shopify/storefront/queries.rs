//! GraphQL operation definitions for Shopify Storefront API.
//!
//! Each operation is a unit struct implementing [`GraphQLQuery`] plus a
//! snake_case module holding its `QUERY` text, `Variables` and `ResponseData`,
//! the same shape `graphql_client` codegen produces. Payload types that several
//! operations select identically (products, carts) are shared below.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::Deserialize;

/// Implement [`GraphQLQuery`] for an operation struct backed by a module.
macro_rules! operation {
    ($name:ident, $module:ident) => {
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $module::QUERY,
                    operation_name: $module::OPERATION_NAME,
                }
            }
        }
    };
}

// =============================================================================
// Shared payload types
// =============================================================================

/// `{ nodes: [...] }` connection shape.
#[derive(Debug, Clone, Deserialize)]
pub struct Nodes<T> {
    pub nodes: Vec<T>,
}

/// `{ edges: [{ node }] }` connection shape.
#[derive(Debug, Clone, Deserialize)]
pub struct Edges<T> {
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyV2 {
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageNode {
    pub url: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariantNode {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub price: MoneyV2,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductNode {
    pub id: String,
    pub title: String,
    pub handle: String,
    #[serde(default)]
    pub description: Option<String>,
    pub images: Nodes<ImageNode>,
    pub variants: Nodes<VariantNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionNode {
    pub id: String,
    pub title: String,
    pub handle: String,
    #[serde(default)]
    pub description: Option<String>,
    pub products: Nodes<ProductNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartNode {
    pub id: String,
    pub checkout_url: String,
    pub total_quantity: i64,
    #[serde(default)]
    pub cost: Option<CartCostNode>,
    pub lines: Edges<CartLineNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCostNode {
    pub total_amount: MoneyV2,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartLineNode {
    pub id: String,
    pub quantity: i64,
    pub merchandise: MerchandiseNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MerchandiseNode {
    pub id: String,
    pub title: String,
    pub product: MerchandiseProductNode,
    #[serde(default)]
    pub image: Option<ImageNode>,
    #[serde(default)]
    pub price: Option<MoneyV2>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MerchandiseProductNode {
    pub title: String,
    pub handle: String,
}

/// Cart fields returned by the line mutations (the full cart is refetched).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummaryNode {
    pub id: String,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserErrorNode {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Payload shared by `cartLinesAdd`, `cartLinesUpdate` and `cartLinesRemove`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLinesPayload {
    pub cart: Option<CartSummaryNode>,
    #[serde(default)]
    pub user_errors: Vec<UserErrorNode>,
}

/// Cart input line (`CartLineInput!`).
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInputVar {
    pub merchandise_id: String,
    pub quantity: i64,
}

/// Cart line update (`CartLineUpdateInput!`).
#[derive(Debug, Clone, serde::Serialize)]
pub struct CartLineUpdateVar {
    pub id: String,
    pub quantity: i64,
}

// =============================================================================
// Shop
// =============================================================================

operation!(GetShop, get_shop);

pub mod get_shop {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "GetShop";
    pub const QUERY: &str = r"
query GetShop {
  shop {
    id
    name
    description
    primaryDomain {
      url
    }
  }
}
";

    #[derive(Debug, Serialize)]
    pub struct Variables;

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub shop: Shop,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Shop {
        pub id: String,
        pub name: String,
        pub description: Option<String>,
        pub primary_domain: PrimaryDomain,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct PrimaryDomain {
        pub url: String,
    }
}

// =============================================================================
// Products
// =============================================================================

operation!(GetProducts, get_products);

pub mod get_products {
    use serde::{Deserialize, Serialize};

    use super::{Nodes, ProductNode};

    pub const OPERATION_NAME: &str = "GetProducts";
    pub const QUERY: &str = r"
query GetProducts($first: Int!) {
  products(first: $first) {
    nodes {
      id
      title
      handle
      images(first: 1) {
        nodes {
          url
          altText
        }
      }
      variants(first: 1) {
        nodes {
          id
          title
          price {
            amount
            currencyCode
          }
        }
      }
    }
  }
}
";

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: Nodes<ProductNode>,
    }
}

operation!(GetProductByHandle, get_product_by_handle);

pub mod get_product_by_handle {
    use serde::{Deserialize, Serialize};

    use super::ProductNode;

    pub const OPERATION_NAME: &str = "GetProductByHandle";
    pub const QUERY: &str = r"
query GetProductByHandle($handle: String!) {
  product(handle: $handle) {
    id
    title
    handle
    description
    images(first: 10) {
      nodes {
        url
        altText
      }
    }
    variants(first: 25) {
      nodes {
        id
        title
        price {
          amount
          currencyCode
        }
      }
    }
  }
}
";

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub handle: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<ProductNode>,
    }
}

// =============================================================================
// Collections
// =============================================================================

operation!(GetCollectionByHandle, get_collection_by_handle);

pub mod get_collection_by_handle {
    use serde::{Deserialize, Serialize};

    use super::CollectionNode;

    pub const OPERATION_NAME: &str = "GetCollectionByHandle";
    pub const QUERY: &str = r"
query GetCollectionByHandle($handle: String!, $productCount: Int!) {
  collection(handle: $handle) {
    id
    title
    handle
    description
    products(first: $productCount) {
      nodes {
        id
        title
        handle
        images(first: 1) {
          nodes {
            url
            altText
          }
        }
        variants(first: 1) {
          nodes {
            id
            title
            price {
              amount
              currencyCode
            }
          }
        }
      }
    }
  }
}
";

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub handle: String,
        pub product_count: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub collection: Option<CollectionNode>,
    }
}

operation!(GetCollections, get_collections);

pub mod get_collections {
    use serde::{Deserialize, Serialize};

    use super::{CollectionNode, Nodes};

    pub const OPERATION_NAME: &str = "GetCollections";
    pub const QUERY: &str = r"
query GetCollections($first: Int!, $productCount: Int!) {
  collections(first: $first) {
    nodes {
      id
      title
      handle
      description
      products(first: $productCount) {
        nodes {
          id
          title
          handle
          images(first: 1) {
            nodes {
              url
              altText
            }
          }
          variants(first: 1) {
            nodes {
              id
              title
              price {
                amount
                currencyCode
              }
            }
          }
        }
      }
    }
  }
}
";

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub first: i64,
        pub product_count: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub collections: Nodes<CollectionNode>,
    }
}

// =============================================================================
// Cart
// =============================================================================

operation!(CreateCart, create_cart);

pub mod create_cart {
    use serde::{Deserialize, Serialize};

    use super::{CartNode, UserErrorNode};

    pub const OPERATION_NAME: &str = "CreateCart";
    pub const QUERY: &str = r"
mutation CreateCart {
  cartCreate {
    cart {
      id
      checkoutUrl
      totalQuantity
      cost {
        totalAmount {
          amount
          currencyCode
        }
      }
      lines(first: 100) {
        edges {
          node {
            id
            quantity
            merchandise {
              ... on ProductVariant {
                id
                title
                product {
                  title
                  handle
                }
                image {
                  url
                  altText
                }
                price {
                  amount
                  currencyCode
                }
              }
            }
          }
        }
      }
    }
    userErrors {
      field
      message
    }
  }
}
";

    #[derive(Debug, Serialize)]
    pub struct Variables;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_create: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub cart: Option<CartNode>,
        #[serde(default)]
        pub user_errors: Vec<UserErrorNode>,
    }
}

operation!(GetCart, get_cart);

pub mod get_cart {
    use serde::{Deserialize, Serialize};

    use super::CartNode;

    pub const OPERATION_NAME: &str = "GetCart";
    pub const QUERY: &str = r"
query GetCart($cartId: ID!) {
  cart(id: $cartId) {
    id
    checkoutUrl
    totalQuantity
    cost {
      totalAmount {
        amount
        currencyCode
      }
    }
    lines(first: 100) {
      edges {
        node {
          id
          quantity
          merchandise {
            ... on ProductVariant {
              id
              title
              product {
                title
                handle
              }
              image {
                url
                altText
              }
              price {
                amount
                currencyCode
              }
            }
          }
        }
      }
    }
  }
}
";

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub cart: Option<CartNode>,
    }
}

operation!(AddToCart, add_to_cart);

pub mod add_to_cart {
    use serde::{Deserialize, Serialize};

    use super::{CartLineInputVar, CartLinesPayload};

    pub const OPERATION_NAME: &str = "AddToCart";
    pub const QUERY: &str = r"
mutation AddToCart($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {
    cart {
      id
      totalQuantity
    }
    userErrors {
      field
      message
    }
  }
}
";

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineInputVar>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_add: Option<CartLinesPayload>,
    }
}

operation!(UpdateCartLines, update_cart_lines);

pub mod update_cart_lines {
    use serde::{Deserialize, Serialize};

    use super::{CartLineUpdateVar, CartLinesPayload};

    pub const OPERATION_NAME: &str = "UpdateCartLines";
    pub const QUERY: &str = r"
mutation UpdateCartLines($cartId: ID!, $lines: [CartLineUpdateInput!]!) {
  cartLinesUpdate(cartId: $cartId, lines: $lines) {
    cart {
      id
      totalQuantity
    }
    userErrors {
      field
      message
    }
  }
}
";

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineUpdateVar>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_update: Option<CartLinesPayload>,
    }
}

operation!(RemoveFromCart, remove_from_cart);

pub mod remove_from_cart {
    use serde::{Deserialize, Serialize};

    use super::CartLinesPayload;

    pub const OPERATION_NAME: &str = "RemoveFromCart";
    pub const QUERY: &str = r"
mutation RemoveFromCart($cartId: ID!, $lineIds: [ID!]!) {
  cartLinesRemove(cartId: $cartId, lineIds: $lineIds) {
    cart {
      id
      totalQuantity
    }
    userErrors {
      field
      message
    }
  }
}
";

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub line_ids: Vec<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_remove: Option<CartLinesPayload>,
    }
}
