//! Composable, serializable conditions over [`Product`].
//!
//! A [`ProductPredicate`] describes *which* products a caller wants without
//! saying *how* to find them. Storage backends translate it into their own
//! query mechanism; [`ProductPredicate::matches`] is the reference semantics
//! every backend must agree with.
//!
//! # Wire format
//!
//! ```json
//! { "op": "any", "predicates": [
//!     { "op": "contains", "field": "name", "value": "elec" },
//!     { "op": "equals", "field": "category", "value": "Electronics" }
//! ] }
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Product, ProductCategory, ProductId};

/// A product field paired with the value it must equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldValue {
    Id(ProductId),
    Name(String),
    Category(ProductCategory),
    /// `None` matches products without a price.
    UnitPrice(Option<Decimal>),
    /// `None` matches products without a stock level.
    UnitsInStock(Option<i32>),
}

/// Text-valued fields that support substring matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextField {
    Name,
    /// Matched against the category's symbolic name.
    Category,
}

/// A boolean condition over a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ProductPredicate {
    /// Field equals value. Text comparison is exact.
    Equals(FieldValue),
    /// Field contains `value`, ignoring case.
    Contains { field: TextField, value: String },
    /// Logical union. An empty union matches nothing.
    Any { predicates: Vec<ProductPredicate> },
    /// Logical intersection. An empty intersection matches everything.
    All { predicates: Vec<ProductPredicate> },
}

impl ProductPredicate {
    /// Matches the product with the given identity.
    #[must_use]
    pub const fn id_equals(id: ProductId) -> Self {
        Self::Equals(FieldValue::Id(id))
    }

    /// Matches products whose name contains `needle`, ignoring case.
    #[must_use]
    pub fn name_contains(needle: impl Into<String>) -> Self {
        Self::Contains {
            field: TextField::Name,
            value: needle.into(),
        }
    }

    /// Matches products whose category name contains `needle`, ignoring case.
    #[must_use]
    pub fn category_contains(needle: impl Into<String>) -> Self {
        Self::Contains {
            field: TextField::Category,
            value: needle.into(),
        }
    }

    /// Union of `predicates`.
    #[must_use]
    pub fn any(predicates: impl IntoIterator<Item = Self>) -> Self {
        Self::Any {
            predicates: predicates.into_iter().collect(),
        }
    }

    /// Intersection of `predicates`.
    #[must_use]
    pub fn all(predicates: impl IntoIterator<Item = Self>) -> Self {
        Self::All {
            predicates: predicates.into_iter().collect(),
        }
    }

    /// Union of `self` and `other`, flattening nested unions.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let mut predicates = Vec::new();
        for predicate in [self, other] {
            match predicate {
                Self::Any { predicates: inner } => predicates.extend(inner),
                other => predicates.push(other),
            }
        }
        Self::Any { predicates }
    }

    /// Evaluate the predicate against a product.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::Equals(expected) => match expected {
                FieldValue::Id(id) => product.id == *id,
                FieldValue::Name(name) => product.name == *name,
                FieldValue::Category(category) => product.category == *category,
                FieldValue::UnitPrice(price) => product.unit_price == *price,
                FieldValue::UnitsInStock(units) => product.units_in_stock == *units,
            },
            Self::Contains { field, value } => {
                let haystack = match field {
                    TextField::Name => product.name.as_str(),
                    TextField::Category => product.category.as_str(),
                };
                contains_ignore_case(haystack, value)
            }
            Self::Any { predicates } => predicates.iter().any(|p| p.matches(product)),
            Self::All { predicates } => predicates.iter().all(|p| p.matches(product)),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(name: &str, category: ProductCategory) -> Product {
        Product {
            id: ProductId::generate(),
            name: name.to_string(),
            category,
            unit_price: None,
            units_in_stock: Some(4),
        }
    }

    #[test]
    fn test_id_equals() {
        let kettle = product("Electric Kettle", ProductCategory::Accessories);
        assert!(ProductPredicate::id_equals(kettle.id).matches(&kettle));
        assert!(!ProductPredicate::id_equals(ProductId::generate()).matches(&kettle));
    }

    #[test]
    fn test_name_contains_ignores_case() {
        let kettle = product("Electric Kettle", ProductCategory::Accessories);
        assert!(ProductPredicate::name_contains("elec").matches(&kettle));
        assert!(ProductPredicate::name_contains("KETTLE").matches(&kettle));
        assert!(!ProductPredicate::name_contains("lamp").matches(&kettle));
    }

    #[test]
    fn test_category_contains_uses_symbolic_name() {
        let lamp = product("Lamp", ProductCategory::Electronics);
        assert!(ProductPredicate::category_contains("elec").matches(&lamp));
        assert!(!ProductPredicate::name_contains("elec").matches(&lamp));
    }

    #[test]
    fn test_equals_nullable_fields() {
        let lamp = product("Lamp", ProductCategory::Electronics);
        assert!(ProductPredicate::Equals(FieldValue::UnitPrice(None)).matches(&lamp));
        assert!(ProductPredicate::Equals(FieldValue::UnitsInStock(Some(4))).matches(&lamp));
        assert!(!ProductPredicate::Equals(FieldValue::UnitsInStock(None)).matches(&lamp));
    }

    #[test]
    fn test_union_and_intersection() {
        let lamp = product("Lamp", ProductCategory::Electronics);
        let union = ProductPredicate::name_contains("elec").or(ProductPredicate::category_contains("elec"));
        assert!(union.matches(&lamp));

        let both = ProductPredicate::all([
            ProductPredicate::name_contains("lamp"),
            ProductPredicate::Equals(FieldValue::Category(ProductCategory::Furniture)),
        ]);
        assert!(!both.matches(&lamp));
    }

    #[test]
    fn test_empty_compositions() {
        let lamp = product("Lamp", ProductCategory::Electronics);
        assert!(!ProductPredicate::any([]).matches(&lamp));
        assert!(ProductPredicate::all([]).matches(&lamp));
    }

    #[test]
    fn test_or_flattens_unions() {
        let a = ProductPredicate::name_contains("a");
        let b = ProductPredicate::name_contains("b");
        let c = ProductPredicate::name_contains("c");
        let combined = a.clone().or(b.clone()).or(c.clone());
        assert_eq!(combined, ProductPredicate::any([a, b, c]));
    }

    #[test]
    fn test_deserialize_wire_format() {
        let json = r#"{
            "op": "any",
            "predicates": [
                { "op": "contains", "field": "name", "value": "elec" },
                { "op": "equals", "field": "category", "value": "Electronics" },
                { "op": "equals", "field": "unitsInStock", "value": null }
            ]
        }"#;
        let predicate: ProductPredicate = serde_json::from_str(json).unwrap();
        assert_eq!(
            predicate,
            ProductPredicate::any([
                ProductPredicate::name_contains("elec"),
                ProductPredicate::Equals(FieldValue::Category(ProductCategory::Electronics)),
                ProductPredicate::Equals(FieldValue::UnitsInStock(None)),
            ])
        );
    }

    #[test]
    fn test_serialize_equals() {
        let id: ProductId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        let json = serde_json::to_value(ProductPredicate::id_equals(id)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "op": "equals",
                "field": "id",
                "value": "67e55044-10b1-426f-9247-bb680e5fe0c8"
            })
        );
    }
}
