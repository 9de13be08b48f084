//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::{CatalogConfig, StorageBackend};
use crate::db::{self, InMemoryProductRepository, PgProductRepository, ProductStore};
use crate::services::ProductService;

/// Error opening the configured storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StateInitError {
    #[error("postgres storage selected but no database URL configured")]
    MissingDatabaseUrl,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    products: ProductService<ProductStore>,
}

impl AppState {
    /// Create application state over an already-opened store.
    #[must_use]
    pub fn new(store: ProductStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                products: ProductService::new(store),
            }),
        }
    }

    /// Open the storage backend named by `config` and build state over it.
    ///
    /// # Errors
    ///
    /// Returns an error if `PostgreSQL` is selected and the pool cannot be
    /// created.
    pub async fn from_config(config: &CatalogConfig) -> Result<Self, StateInitError> {
        let store = match config.storage {
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .as_ref()
                    .ok_or(StateInitError::MissingDatabaseUrl)?;
                let pool = db::create_pool(url, config.db_max_connections).await?;
                tracing::info!("Database pool created");
                ProductStore::Postgres(PgProductRepository::new(pool))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; products are lost on restart");
                ProductStore::Memory(InMemoryProductRepository::new())
            }
        };

        Ok(Self::new(store))
    }

    /// Get a reference to the product service.
    #[must_use]
    pub fn products(&self) -> &ProductService<ProductStore> {
        &self.inner.products
    }
}
