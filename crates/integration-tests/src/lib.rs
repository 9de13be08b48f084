//! Integration test harness for the product catalog API.
//!
//! [`TestServer::spawn`] serves the real router on an ephemeral port over
//! in-memory storage, so the tests need no database.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p product-catalog-integration-tests
//! ```

use std::net::SocketAddr;

use product_catalog_api::config::{CatalogConfig, StorageBackend};
use product_catalog_api::db::{InMemoryProductRepository, ProductStore};
use product_catalog_api::state::AppState;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A catalog API instance running in the background.
pub struct TestServer {
    addr: SocketAddr,
    client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Bind `127.0.0.1:0` and serve the catalog router on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        let config = CatalogConfig {
            storage: StorageBackend::Memory,
            port: 0,
            ..CatalogConfig::default()
        };
        let listener = TcpListener::bind(config.socket_addr()).await?;
        let addr = listener.local_addr()?;

        let state = AppState::new(ProductStore::Memory(InMemoryProductRepository::new()));
        let app = product_catalog_api::app(state);
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                report_server_error(&e);
            }
        });

        Ok(Self {
            addr,
            client: reqwest::Client::new(),
            handle,
        })
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Shared HTTP client.
    #[must_use]
    pub const fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[allow(clippy::print_stderr)]
fn report_server_error(e: &std::io::Error) {
    eprintln!("test server stopped: {e}");
}
