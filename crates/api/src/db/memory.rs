//! Process-local product storage.

use std::sync::Arc;

use product_catalog_core::{Product, ProductId, ProductPredicate};
use tokio::sync::RwLock;

use super::{ProductRepository, RepositoryError};

/// Products held in memory, in insertion order.
///
/// Clones share the same underlying list.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<Vec<Product>>>,
}

impl InMemoryProductRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored products.
    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    /// Whether no products are stored.
    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }
}

impl ProductRepository for InMemoryProductRepository {
    async fn get_all(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.products.read().await.clone())
    }

    async fn get_all_by_condition(
        &self,
        predicate: &ProductPredicate,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .filter(|product| predicate.matches(product))
            .cloned()
            .collect())
    }

    async fn get_one_by_condition(
        &self,
        predicate: &ProductPredicate,
    ) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .find(|product| predicate.matches(product))
            .cloned())
    }

    async fn add(&self, mut product: Product) -> Result<Option<Product>, RepositoryError> {
        let mut products = self.products.write().await;
        if !product.id.is_assigned() {
            product.id = ProductId::generate();
        }
        if products.iter().any(|existing| existing.id == product.id) {
            return Ok(None);
        }
        products.push(product.clone());
        Ok(Some(product))
    }

    async fn update(&self, product: Product) -> Result<Option<Product>, RepositoryError> {
        let mut products = self.products.write().await;
        let Some(stored) = products.iter_mut().find(|existing| existing.id == product.id) else {
            return Ok(None);
        };
        stored.overwrite_fields(&product);
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|product| product.id != id);
        Ok(products.len() < before)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
