//! Seed the catalog with sample products.
//!
//! Products go through the regular service, so they are validated exactly
//! like API writes. A sample whose name is already present is skipped,
//! which makes the command safe to re-run.

use product_catalog_api::db::{self, PgProductRepository};
use product_catalog_api::services::{ProductService, ProductServiceError};
use product_catalog_core::{AddProductRequest, FieldValue, ProductPredicate};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: CATALOG_DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Could not add '{name}': {source}")]
    Product {
        name: String,
        #[source]
        source: ProductServiceError,
    },
}

/// Outcome of a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Sample products inserted by `catalog-cli seed`.
#[must_use]
pub fn sample_products() -> Vec<AddProductRequest> {
    let sample = |name: &str, category: &str, cents: i64, stock: i64| AddProductRequest {
        name: name.to_string(),
        category: category.to_string(),
        unit_price: Some(json!(Decimal::new(cents, 2))),
        units_in_stock: Some(json!(stock)),
    };

    vec![
        sample("Electric Kettle", "Accessories", 3499, 25),
        sample("Lamp", "Electronics", 1999, 40),
        sample("Fan", "HomeAppliances", 2550, 10),
        sample("Writing Desk", "Furniture", 18900, 4),
        sample("USB-C Cable", "Accessories", 899, 150),
        AddProductRequest {
            name: "Bookshelf".to_string(),
            category: "Furniture".to_string(),
            unit_price: None,
            units_in_stock: None,
        },
    ]
}

/// Insert every sample product that is not already present.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails or
/// a sample is rejected.
pub async fn run() -> Result<SeedSummary, SeedError> {
    let database_url = super::database_url().ok_or(SeedError::MissingDatabaseUrl)?;

    let pool = db::create_pool(&database_url, 2).await?;
    tracing::info!("Connected to catalog database");

    let service = ProductService::new(PgProductRepository::new(pool));
    let mut summary = SeedSummary::default();

    for request in sample_products() {
        let name = request.name.clone();
        let existing = service
            .get_one_by_condition(&ProductPredicate::Equals(FieldValue::Name(name.clone())))
            .await
            .map_err(|source| SeedError::Product {
                name: name.clone(),
                source,
            })?;
        if existing.is_some() {
            tracing::info!(product = %name, "Already present, skipping");
            summary.skipped += 1;
            continue;
        }

        match service.add(request).await {
            Ok(Some(product)) => {
                tracing::info!(product = %name, id = %product.id, "Inserted");
                summary.inserted += 1;
            }
            Ok(None) => {
                tracing::warn!(product = %name, "Storage declined product, skipping");
                summary.skipped += 1;
            }
            Err(source) => return Err(SeedError::Product { name, source }),
        }
    }

    Ok(summary)
}
