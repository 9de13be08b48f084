//! The product entity.

use rust_decimal::Decimal;

use super::{ProductCategory, ProductId};

/// A product record as held by storage.
///
/// This is the storage-facing shape; callers only ever see
/// [`ProductResponse`](crate::dto::ProductResponse) copies of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Storage-assigned identity. [`ProductId::unassigned`] until inserted.
    pub id: ProductId,
    /// Display name, never blank once validated.
    pub name: String,
    /// Category the product is listed under.
    pub category: ProductCategory,
    /// Price per unit, if known.
    pub unit_price: Option<Decimal>,
    /// Units currently in stock, if tracked.
    pub units_in_stock: Option<i32>,
}

impl Product {
    /// Overwrite the mutable fields with those of `other`, keeping `self.id`.
    pub fn overwrite_fields(&mut self, other: &Self) {
        self.name.clone_from(&other.name);
        self.category = other.category;
        self.unit_price = other.unit_price;
        self.units_in_stock = other.units_in_stock;
    }
}
