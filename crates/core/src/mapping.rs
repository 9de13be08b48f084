//! Conversion between validated requests, entities and responses.
//!
//! Every conversion is total and copies field by field. The one asymmetry is
//! identity: a create never carries one (storage assigns it), an update always
//! does (it locates the row), and a response always echoes it.

use crate::dto::ProductResponse;
use crate::types::{Product, ProductId};
use crate::validation::{ProductDraft, ProductRevision};

/// Request/entity/response conversions used by the product service.
pub trait ProductMapper: Send + Sync {
    /// Entity for a create. Identity is left [`ProductId::unassigned`].
    fn draft_to_entity(&self, draft: ProductDraft) -> Product;

    /// Entity for an update. Identity is copied from the revision.
    fn revision_to_entity(&self, revision: ProductRevision) -> Product;

    /// Caller-facing copy of an entity.
    fn entity_to_response(&self, product: &Product) -> ProductResponse;
}

/// Straight field-by-field mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProductMapper;

impl ProductMapper for DefaultProductMapper {
    fn draft_to_entity(&self, draft: ProductDraft) -> Product {
        Product {
            id: ProductId::unassigned(),
            name: draft.name,
            category: draft.category,
            unit_price: draft.unit_price,
            units_in_stock: draft.units_in_stock,
        }
    }

    fn revision_to_entity(&self, revision: ProductRevision) -> Product {
        let ProductRevision { id, draft } = revision;
        Product {
            id,
            ..self.draft_to_entity(draft)
        }
    }

    fn entity_to_response(&self, product: &Product) -> ProductResponse {
        ProductResponse {
            id: product.id,
            name: product.name.clone(),
            category: product.category,
            unit_price: product.unit_price,
            units_in_stock: product.units_in_stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::ProductCategory;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Lamp".to_string(),
            category: ProductCategory::Electronics,
            unit_price: Some(Decimal::new(1999, 2)),
            units_in_stock: None,
        }
    }

    #[test]
    fn test_draft_never_carries_identity() {
        let product = DefaultProductMapper.draft_to_entity(draft());
        assert!(!product.id.is_assigned());
        assert_eq!(product.name, "Lamp");
        assert_eq!(product.unit_price, Some(Decimal::new(1999, 2)));
    }

    #[test]
    fn test_revision_copies_identity() {
        let id = ProductId::generate();
        let product = DefaultProductMapper.revision_to_entity(ProductRevision { id, draft: draft() });
        assert_eq!(product.id, id);
        assert_eq!(product.category, ProductCategory::Electronics);
    }

    #[test]
    fn test_response_copies_every_field() {
        let id = ProductId::generate();
        let product = DefaultProductMapper.revision_to_entity(ProductRevision { id, draft: draft() });
        let response = DefaultProductMapper.entity_to_response(&product);
        assert_eq!(
            response,
            ProductResponse {
                id,
                name: "Lamp".to_string(),
                category: ProductCategory::Electronics,
                unit_price: Some(Decimal::new(1999, 2)),
                units_in_stock: None,
            }
        );
    }
}
