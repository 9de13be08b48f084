//! Request and response shapes exchanged with callers.
//!
//! Requests are loose: the category is a raw string and the numeric fields
//! keep whatever JSON the caller sent. Every malformed value (wrong type, out
//! of range, unknown name) reaches [`validation`](crate::validation) and is
//! reported together, instead of failing one field at a time during
//! deserialization.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ProductCategory, ProductId};

/// Payload for creating a product. Has no identity; storage assigns one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProductRequest {
    #[serde(default)]
    pub name: String,
    /// Symbolic category name, e.g. `"Electronics"`.
    #[serde(default)]
    pub category: String,
    /// Number or decimal string, e.g. `25.5` or `"25.5"`.
    #[serde(default)]
    pub unit_price: Option<Value>,
    #[serde(default)]
    pub units_in_stock: Option<Value>,
}

/// Payload for replacing the fields of an existing product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    /// Identity of the product to update.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Number or decimal string, e.g. `25.5` or `"25.5"`.
    #[serde(default)]
    pub unit_price: Option<Value>,
    #[serde(default)]
    pub units_in_stock: Option<Value>,
}

/// A product as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub category: ProductCategory,
    pub unit_price: Option<Decimal>,
    pub units_in_stock: Option<i32>,
}
