//! Shopfront Core - Shared domain types.
//!
//! Types used by the storefront binary and its integration tests:
//! - Shopify global IDs (`gid://shopify/<Resource>/<id>`) as distinct newtypes
//! - Prices with currency-aware display formatting
//! - Cart line quantities that cannot be zero
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices and quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
