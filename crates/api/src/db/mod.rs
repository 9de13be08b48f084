//! Product storage.
//!
//! [`ProductRepository`] is the port the product service talks to. Two
//! backends implement it:
//!
//! - [`PgProductRepository`] - `catalog.product` in `PostgreSQL`
//! - [`InMemoryProductRepository`] - a process-local list for tests and
//!   `CATALOG_STORAGE=memory`
//!
//! [`ProductStore`] picks one of them at startup.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p product-catalog-cli -- migrate
//! ```

pub mod memory;
pub mod products;

use std::future::Future;
use std::time::Duration;

use product_catalog_core::{Product, ProductId, ProductPredicate};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::InMemoryProductRepository;
pub use products::PgProductRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(2.min(max_connections))
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Storage port for products.
///
/// Implementations must be safe to share between concurrent requests.
/// "Nothing matched" is an empty result or `None`, never an error.
pub trait ProductRepository: Send + Sync {
    /// Every stored product.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// Every product satisfying `predicate`.
    fn get_all_by_condition(
        &self,
        predicate: &ProductPredicate,
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// The first product satisfying `predicate`, if any.
    fn get_one_by_condition(
        &self,
        predicate: &ProductPredicate,
    ) -> impl Future<Output = Result<Option<Product>, RepositoryError>> + Send;

    /// Persist a new product, assigning its identity.
    ///
    /// Returns `None` when storage declines to persist it, e.g. because the
    /// identity is already taken.
    fn add(
        &self,
        product: Product,
    ) -> impl Future<Output = Result<Option<Product>, RepositoryError>> + Send;

    /// Replace the fields of the product with `product.id`.
    ///
    /// Returns `None` if no such product exists.
    fn update(
        &self,
        product: Product,
    ) -> impl Future<Output = Result<Option<Product>, RepositoryError>> + Send;

    /// Remove the product with `id`. Returns whether anything was removed.
    fn delete(&self, id: ProductId) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Check that the backend is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// The storage backend chosen at startup.
#[derive(Debug, Clone)]
pub enum ProductStore {
    Postgres(PgProductRepository),
    Memory(InMemoryProductRepository),
}

impl ProductRepository for ProductStore {
    async fn get_all(&self) -> Result<Vec<Product>, RepositoryError> {
        match self {
            Self::Postgres(repo) => repo.get_all().await,
            Self::Memory(repo) => repo.get_all().await,
        }
    }

    async fn get_all_by_condition(
        &self,
        predicate: &ProductPredicate,
    ) -> Result<Vec<Product>, RepositoryError> {
        match self {
            Self::Postgres(repo) => repo.get_all_by_condition(predicate).await,
            Self::Memory(repo) => repo.get_all_by_condition(predicate).await,
        }
    }

    async fn get_one_by_condition(
        &self,
        predicate: &ProductPredicate,
    ) -> Result<Option<Product>, RepositoryError> {
        match self {
            Self::Postgres(repo) => repo.get_one_by_condition(predicate).await,
            Self::Memory(repo) => repo.get_one_by_condition(predicate).await,
        }
    }

    async fn add(&self, product: Product) -> Result<Option<Product>, RepositoryError> {
        match self {
            Self::Postgres(repo) => repo.add(product).await,
            Self::Memory(repo) => repo.add(product).await,
        }
    }

    async fn update(&self, product: Product) -> Result<Option<Product>, RepositoryError> {
        match self {
            Self::Postgres(repo) => repo.update(product).await,
            Self::Memory(repo) => repo.update(product).await,
        }
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        match self {
            Self::Postgres(repo) => repo.delete(id).await,
            Self::Memory(repo) => repo.delete(id).await,
        }
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        match self {
            Self::Postgres(repo) => repo.ping().await,
            Self::Memory(repo) => repo.ping().await,
        }
    }
}
