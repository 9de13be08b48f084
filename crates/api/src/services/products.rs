//! Product orchestration.
//!
//! [`ProductService`] sequences validation, mapping and storage for every
//! product operation. Collaborators are injected, so tests can substitute
//! any of them.

use std::collections::HashSet;

use product_catalog_core::{
    AddProductRequest, DefaultProductMapper, DefaultProductValidator, ProductId, ProductMapper,
    ProductPredicate, ProductResponse, ProductValidator, UpdateProductRequest, ValidationErrors,
};
use thiserror::Error;
use tracing::instrument;

use crate::db::{ProductRepository, RepositoryError};

/// Errors returned by [`ProductService`].
///
/// "Not found" is not an error: lookups return `Option`.
#[derive(Debug, Error)]
pub enum ProductServiceError {
    /// The request broke one or more field rules.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// An update named a product that does not exist.
    #[error("no product with id '{0}'")]
    InvalidReference(String),

    /// The storage backend failed.
    #[error("storage failure: {0}")]
    Storage(#[from] RepositoryError),
}

/// Product operations over an injected storage backend.
#[derive(Debug, Clone)]
pub struct ProductService<R, V = DefaultProductValidator, M = DefaultProductMapper> {
    repository: R,
    validator: V,
    mapper: M,
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a service with the standard validator and mapper.
    #[must_use]
    pub const fn new(repository: R) -> Self {
        Self::with_collaborators(repository, DefaultProductValidator, DefaultProductMapper)
    }
}

impl<R, V, M> ProductService<R, V, M>
where
    R: ProductRepository,
    V: ProductValidator,
    M: ProductMapper,
{
    /// Create a service from explicit collaborators.
    #[must_use]
    pub const fn with_collaborators(repository: R, validator: V, mapper: M) -> Self {
        Self {
            repository,
            validator,
            mapper,
        }
    }

    /// The storage backend.
    #[must_use]
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    /// Every product.
    ///
    /// # Errors
    ///
    /// Returns `ProductServiceError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<ProductResponse>, ProductServiceError> {
        let products = self.repository.get_all().await?;
        Ok(products
            .iter()
            .map(|product| self.mapper.entity_to_response(product))
            .collect())
    }

    /// Every product satisfying `predicate`. Empty when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns `ProductServiceError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub async fn list_by_condition(
        &self,
        predicate: &ProductPredicate,
    ) -> Result<Vec<ProductResponse>, ProductServiceError> {
        let products = self.repository.get_all_by_condition(predicate).await?;
        Ok(products
            .iter()
            .map(|product| self.mapper.entity_to_response(product))
            .collect())
    }

    /// The first product satisfying `predicate`, if any.
    ///
    /// # Errors
    ///
    /// Returns `ProductServiceError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub async fn get_one_by_condition(
        &self,
        predicate: &ProductPredicate,
    ) -> Result<Option<ProductResponse>, ProductServiceError> {
        let product = self.repository.get_one_by_condition(predicate).await?;
        Ok(product.map(|product| self.mapper.entity_to_response(&product)))
    }

    /// The product with `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns `ProductServiceError::Storage` if the backend fails.
    pub async fn get_by_id(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductResponse>, ProductServiceError> {
        self.get_one_by_condition(&ProductPredicate::id_equals(id))
            .await
    }

    /// Validate and store a new product.
    ///
    /// Returns `None` if storage declined to persist it.
    ///
    /// # Errors
    ///
    /// Returns `ProductServiceError::Validation` with every broken rule
    /// (storage is not touched), or `ProductServiceError::Storage` if the
    /// backend fails.
    #[instrument(skip(self, request), fields(product_name = %request.name))]
    pub async fn add(
        &self,
        request: AddProductRequest,
    ) -> Result<Option<ProductResponse>, ProductServiceError> {
        let draft = self.validator.validate_add(&request)?;
        let entity = self.mapper.draft_to_entity(draft);

        let Some(stored) = self.repository.add(entity).await? else {
            tracing::warn!("Storage declined to persist product");
            return Ok(None);
        };

        tracing::info!(product_id = %stored.id, "Product created");
        Ok(Some(self.mapper.entity_to_response(&stored)))
    }

    /// Replace the fields of an existing product.
    ///
    /// The target must exist before the request is validated.
    ///
    /// # Errors
    ///
    /// Returns `ProductServiceError::InvalidReference` if the product does not
    /// exist (or disappears before the write lands),
    /// `ProductServiceError::Validation` with every broken rule, or
    /// `ProductServiceError::Storage` if the backend fails.
    #[instrument(skip(self, request), fields(product_id = %request.id))]
    pub async fn update(
        &self,
        request: UpdateProductRequest,
    ) -> Result<ProductResponse, ProductServiceError> {
        let existing = match request.id.parse::<ProductId>() {
            Ok(id) if id.is_assigned() => {
                self.repository
                    .get_one_by_condition(&ProductPredicate::id_equals(id))
                    .await?
            }
            _ => None,
        };
        if existing.is_none() {
            return Err(ProductServiceError::InvalidReference(request.id));
        }

        let revision = self.validator.validate_update(&request)?;
        let entity = self.mapper.revision_to_entity(revision);
        let id = entity.id;

        let Some(updated) = self.repository.update(entity).await? else {
            tracing::warn!(product_id = %id, "Product removed before update was applied");
            return Err(ProductServiceError::InvalidReference(id.to_string()));
        };

        tracing::info!(product_id = %updated.id, "Product updated");
        Ok(self.mapper.entity_to_response(&updated))
    }

    /// Remove the product with `id`. Returns whether it was removed.
    ///
    /// # Errors
    ///
    /// Returns `ProductServiceError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<bool, ProductServiceError> {
        let existing = self
            .repository
            .get_one_by_condition(&ProductPredicate::id_equals(id))
            .await?;
        if existing.is_none() {
            return Ok(false);
        }

        let deleted = self.repository.delete(id).await?;
        if deleted {
            tracing::info!(product_id = %id, "Product deleted");
        } else {
            tracing::warn!(product_id = %id, "Product removed before delete was applied");
        }
        Ok(deleted)
    }

    /// Products whose name or category contains `text`, ignoring case.
    ///
    /// Name matches come first. A product matching both appears once.
    ///
    /// # Errors
    ///
    /// Returns `ProductServiceError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub async fn search(&self, text: &str) -> Result<Vec<ProductResponse>, ProductServiceError> {
        let by_name = ProductPredicate::name_contains(text);
        let by_category = ProductPredicate::category_contains(text);
        let (name_matches, category_matches) = tokio::try_join!(
            self.list_by_condition(&by_name),
            self.list_by_condition(&by_category),
        )?;

        let mut seen = HashSet::new();
        Ok(name_matches
            .into_iter()
            .chain(category_matches)
            .filter(|product| seen.insert(product.id))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use product_catalog_core::validation::{
        FIELD_CATEGORY, FIELD_NAME, FIELD_UNIT_PRICE, FIELD_UNITS_IN_STOCK,
    };
    use product_catalog_core::{FieldValue, Product, ProductCategory};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::db::InMemoryProductRepository;

    /// Counts every storage call, delegating to an in-memory store.
    #[derive(Debug, Clone, Default)]
    struct CountingRepository {
        inner: InMemoryProductRepository,
        reads: Arc<AtomicUsize>,
        writes: Arc<AtomicUsize>,
    }

    impl CountingRepository {
        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        fn calls(&self) -> usize {
            self.reads() + self.writes()
        }
    }

    impl ProductRepository for CountingRepository {
        async fn get_all(&self) -> Result<Vec<Product>, RepositoryError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_all().await
        }

        async fn get_all_by_condition(
            &self,
            predicate: &ProductPredicate,
        ) -> Result<Vec<Product>, RepositoryError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_all_by_condition(predicate).await
        }

        async fn get_one_by_condition(
            &self,
            predicate: &ProductPredicate,
        ) -> Result<Option<Product>, RepositoryError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_one_by_condition(predicate).await
        }

        async fn add(&self, product: Product) -> Result<Option<Product>, RepositoryError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.add(product).await
        }

        async fn update(&self, product: Product) -> Result<Option<Product>, RepositoryError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.update(product).await
        }

        async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete(id).await
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            self.inner.ping().await
        }
    }

    /// Reports a product as present, then loses it before any write lands.
    #[derive(Debug)]
    struct VanishingRepository {
        product: Product,
    }

    impl ProductRepository for VanishingRepository {
        async fn get_all(&self) -> Result<Vec<Product>, RepositoryError> {
            Ok(vec![self.product.clone()])
        }

        async fn get_all_by_condition(
            &self,
            predicate: &ProductPredicate,
        ) -> Result<Vec<Product>, RepositoryError> {
            Ok(self.get_one_by_condition(predicate).await?.into_iter().collect())
        }

        async fn get_one_by_condition(
            &self,
            predicate: &ProductPredicate,
        ) -> Result<Option<Product>, RepositoryError> {
            Ok(predicate
                .matches(&self.product)
                .then(|| self.product.clone()))
        }

        async fn add(&self, _product: Product) -> Result<Option<Product>, RepositoryError> {
            Ok(None)
        }

        async fn update(&self, _product: Product) -> Result<Option<Product>, RepositoryError> {
            Ok(None)
        }

        async fn delete(&self, _id: ProductId) -> Result<bool, RepositoryError> {
            Ok(false)
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    fn add_request(name: &str, category: &str) -> AddProductRequest {
        AddProductRequest {
            name: name.to_string(),
            category: category.to_string(),
            unit_price: Some(json!(Decimal::new(1999, 2))),
            units_in_stock: Some(json!(4)),
        }
    }

    fn update_request(id: &str, name: &str) -> UpdateProductRequest {
        UpdateProductRequest {
            id: id.to_string(),
            name: name.to_string(),
            category: "Furniture".to_string(),
            unit_price: Some(json!(Decimal::new(4500, 2))),
            units_in_stock: Some(json!(2)),
        }
    }

    fn service() -> ProductService<CountingRepository> {
        ProductService::new(CountingRepository::default())
    }

    #[tokio::test]
    async fn test_add_assigns_fresh_identity_and_echoes_fields() {
        let service = service();
        let first = service
            .add(add_request("Chair", "Furniture"))
            .await
            .unwrap()
            .unwrap();
        let before: Vec<ProductId> = service.list_all().await.unwrap().iter().map(|p| p.id).collect();

        let second = service
            .add(add_request("Desk", "Furniture"))
            .await
            .unwrap()
            .unwrap();

        assert!(second.id.is_assigned());
        assert!(!before.contains(&second.id));
        assert_ne!(first.id, second.id);
        assert_eq!(second.name, "Desk");
        assert_eq!(second.category, ProductCategory::Furniture);
        assert_eq!(second.unit_price, Some(Decimal::new(1999, 2)));
        assert_eq!(second.units_in_stock, Some(4));
    }

    #[tokio::test]
    async fn test_add_then_get_returns_equal_response() {
        let service = service();
        let added = service
            .add(add_request("Lamp", "Electronics"))
            .await
            .unwrap()
            .unwrap();

        let fetched = service.get_by_id(added.id).await.unwrap().unwrap();
        assert_eq!(fetched, added);
    }

    #[tokio::test]
    async fn test_add_declined_by_storage_is_none() {
        let service = ProductService::new(VanishingRepository {
            product: Product {
                id: ProductId::generate(),
                name: "Lamp".to_string(),
                category: ProductCategory::Electronics,
                unit_price: None,
                units_in_stock: None,
            },
        });

        let added = service.add(add_request("Chair", "Furniture")).await.unwrap();
        assert!(added.is_none());
    }

    #[tokio::test]
    async fn test_add_invalid_fields_never_touch_storage() {
        let cases = [
            (add_request("", "Furniture"), FIELD_NAME),
            (add_request("Chair", "Toys"), FIELD_CATEGORY),
            (
                AddProductRequest {
                    unit_price: Some(json!(Decimal::new(-1, 0))),
                    ..add_request("Chair", "Furniture")
                },
                FIELD_UNIT_PRICE,
            ),
            (
                AddProductRequest {
                    units_in_stock: Some(json!(-1)),
                    ..add_request("Chair", "Furniture")
                },
                FIELD_UNITS_IN_STOCK,
            ),
        ];

        for (request, field) in cases {
            let service = service();
            let ProductServiceError::Validation(errors) = service.add(request).await.unwrap_err()
            else {
                panic!("expected validation failure for {field}");
            };
            assert!(errors.has_field(field));
            assert_eq!(service.repository().calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_add_reports_every_failure_at_once() {
        let service = service();
        let request = AddProductRequest {
            name: "  ".to_string(),
            category: String::new(),
            unit_price: Some(json!(Decimal::new(-5, 1))),
            units_in_stock: Some(json!(-2)),
        };

        let ProductServiceError::Validation(errors) = service.add(request).await.unwrap_err() else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.errors().len(), 4);
    }

    #[tokio::test]
    async fn test_update_missing_identity_is_invalid_reference() {
        let service = service();
        service
            .add(add_request("Chair", "Furniture"))
            .await
            .unwrap()
            .unwrap();
        let before = service.list_all().await.unwrap();

        for id in [ProductId::generate().to_string(), "not-a-uuid".to_string(), String::new()] {
            let err = service.update(update_request(&id, "Desk")).await.unwrap_err();
            assert!(matches!(err, ProductServiceError::InvalidReference(ref got) if *got == id));
        }

        assert_eq!(service.list_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_invalid_fields_never_write() {
        let service = service();
        let added = service
            .add(add_request("Chair", "Furniture"))
            .await
            .unwrap()
            .unwrap();
        let id = added.id.to_string();
        let writes_before = service.repository().writes();

        let cases = [
            (update_request(&id, ""), FIELD_NAME),
            (
                UpdateProductRequest {
                    category: "Garden".to_string(),
                    ..update_request(&id, "Chair")
                },
                FIELD_CATEGORY,
            ),
            (
                UpdateProductRequest {
                    unit_price: Some(json!(Decimal::new(-100, 2))),
                    ..update_request(&id, "Chair")
                },
                FIELD_UNIT_PRICE,
            ),
            (
                UpdateProductRequest {
                    units_in_stock: Some(json!(-7)),
                    ..update_request(&id, "Chair")
                },
                FIELD_UNITS_IN_STOCK,
            ),
        ];

        for (request, field) in cases {
            let ProductServiceError::Validation(errors) = service.update(request).await.unwrap_err()
            else {
                panic!("expected validation failure for {field}");
            };
            assert!(errors.has_field(field));
        }

        assert_eq!(service.repository().writes(), writes_before);
        assert_eq!(service.get_by_id(added.id).await.unwrap().unwrap(), added);
    }

    #[tokio::test]
    async fn test_update_racing_delete_is_invalid_reference() {
        let product = Product {
            id: ProductId::generate(),
            name: "Chair".to_string(),
            category: ProductCategory::Furniture,
            unit_price: None,
            units_in_stock: None,
        };
        let id = product.id.to_string();
        let service = ProductService::new(VanishingRepository { product });

        let err = service.update(update_request(&id, "Desk")).await.unwrap_err();
        assert!(matches!(err, ProductServiceError::InvalidReference(got) if got == id));
    }

    #[tokio::test]
    async fn test_delete_semantics() {
        let service = service();
        let added = service
            .add(add_request("Chair", "Furniture"))
            .await
            .unwrap()
            .unwrap();
        let before = service.list_all().await.unwrap();
        let writes_before = service.repository().writes();

        assert!(!service.delete(ProductId::generate()).await.unwrap());
        assert_eq!(service.repository().writes(), writes_before);
        assert_eq!(service.list_all().await.unwrap(), before);

        assert!(service.delete(added.id).await.unwrap());
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_unions_name_and_category_once() {
        let service = service();
        let kettle = service
            .add(add_request("Electric Kettle", "Accessories"))
            .await
            .unwrap()
            .unwrap();
        let lamp = service
            .add(add_request("Lamp", "Electronics"))
            .await
            .unwrap()
            .unwrap();
        let speaker = service
            .add(add_request("Electro Speaker", "Electronics"))
            .await
            .unwrap()
            .unwrap();
        service
            .add(add_request("Sofa", "Furniture"))
            .await
            .unwrap()
            .unwrap();

        let results = service.search("elec").await.unwrap();
        let ids: Vec<ProductId> = results.iter().map(|p| p.id).collect();

        assert_eq!(ids, [kettle.id, speaker.id, lamp.id]);
    }

    #[tokio::test]
    async fn test_empty_matches_are_empty_lists() {
        let service = service();
        service
            .add(add_request("Chair", "Furniture"))
            .await
            .unwrap()
            .unwrap();

        let none = service
            .list_by_condition(&ProductPredicate::Equals(FieldValue::Name("Sofa".to_string())))
            .await
            .unwrap();
        assert!(none.is_empty());
        assert!(service.search("zzz").await.unwrap().is_empty());
        assert!(
            service
                .get_one_by_condition(&ProductPredicate::any([]))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_fan_lifecycle() {
        let service = service();
        let added = service
            .add(AddProductRequest {
                name: "Fan".to_string(),
                category: "HomeAppliances".to_string(),
                unit_price: Some(json!(Decimal::new(255, 1))),
                units_in_stock: Some(json!(10)),
            })
            .await
            .unwrap()
            .unwrap();
        assert!(added.id.is_assigned());

        let updated = service
            .update(UpdateProductRequest {
                id: added.id.to_string(),
                name: "Fan".to_string(),
                category: "HomeAppliances".to_string(),
                unit_price: Some(json!(Decimal::new(300, 1))),
                units_in_stock: Some(json!(8)),
            })
            .await
            .unwrap();
        assert_eq!(updated.id, added.id);
        assert_eq!(updated.unit_price, Some(Decimal::new(30, 0)));
        assert_eq!(updated.units_in_stock, Some(8));

        assert!(service.delete(added.id).await.unwrap());
        assert!(service.get_by_id(added.id).await.unwrap().is_none());
    }
}
