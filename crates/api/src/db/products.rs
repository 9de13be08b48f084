//! `PostgreSQL` product repository.
//!
//! Predicates are rendered to SQL with [`QueryBuilder`], so every value is
//! sent as a bind parameter. Listings follow insertion order (`created_seq`),
//! which keeps "first match" stable.

use product_catalog_core::{
    FieldValue, Product, ProductCategory, ProductId, ProductPredicate, TextField,
};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{ProductRepository, RepositoryError};

const SELECT_PRODUCTS: &str =
    "SELECT id, name, category, unit_price, units_in_stock FROM catalog.product";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    category: String,
    unit_price: Option<Decimal>,
    units_in_stock: Option<i32>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let category: ProductCategory = row.category.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid category in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            category,
            unit_price: row.unit_price,
            units_in_stock: row.units_in_stock,
        })
    }
}

// =============================================================================
// Predicate Rendering
// =============================================================================

const fn text_column(field: TextField) -> &'static str {
    match field {
        TextField::Name => "name",
        TextField::Category => "category",
    }
}

/// Append `predicate` as a boolean SQL expression.
fn push_predicate(builder: &mut QueryBuilder<'static, Postgres>, predicate: &ProductPredicate) {
    match predicate {
        ProductPredicate::Equals(expected) => match expected {
            FieldValue::Id(id) => {
                builder.push("id = ").push_bind(*id);
            }
            FieldValue::Name(name) => {
                builder.push("name = ").push_bind(name.clone());
            }
            FieldValue::Category(category) => {
                builder.push("category = ").push_bind(*category);
            }
            FieldValue::UnitPrice(price) => {
                builder.push("unit_price IS NOT DISTINCT FROM ").push_bind(*price);
            }
            FieldValue::UnitsInStock(units) => {
                builder
                    .push("units_in_stock IS NOT DISTINCT FROM ")
                    .push_bind(*units);
            }
        },
        ProductPredicate::Contains { field, value } => {
            builder
                .push("strpos(lower(")
                .push(text_column(*field))
                .push("), lower(")
                .push_bind(value.clone())
                .push(")) > 0");
        }
        ProductPredicate::Any { predicates } => push_joined(builder, predicates, " OR ", "FALSE"),
        ProductPredicate::All { predicates } => push_joined(builder, predicates, " AND ", "TRUE"),
    }
}

fn push_joined(
    builder: &mut QueryBuilder<'static, Postgres>,
    predicates: &[ProductPredicate],
    separator: &str,
    empty: &str,
) {
    if predicates.is_empty() {
        builder.push(empty);
        return;
    }
    builder.push("(");
    for (i, predicate) in predicates.iter().enumerate() {
        if i > 0 {
            builder.push(separator);
        }
        push_predicate(builder, predicate);
    }
    builder.push(")");
}

/// `SELECT ... WHERE <predicate> ORDER BY created_seq`.
fn select_where(predicate: &ProductPredicate) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(SELECT_PRODUCTS);
    builder.push(" WHERE ");
    push_predicate(&mut builder, predicate);
    builder.push(" ORDER BY created_seq");
    builder
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for PgProductRepository {
    async fn get_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, category, unit_price, units_in_stock
            FROM catalog.product
            ORDER BY created_seq
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get_all_by_condition(
        &self,
        predicate: &ProductPredicate,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut builder = select_where(predicate);
        let rows = builder
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get_one_by_condition(
        &self,
        predicate: &ProductPredicate,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut builder = select_where(predicate);
        builder.push(" LIMIT 1");
        let row = builder
            .build_query_as::<ProductRow>()
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn add(&self, product: Product) -> Result<Option<Product>, RepositoryError> {
        let id = if product.id.is_assigned() {
            product.id
        } else {
            ProductId::generate()
        };

        // An identity collision inserts nothing and returns no row.
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO catalog.product (id, name, category, unit_price, units_in_stock)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            RETURNING id, name, category, unit_price, units_in_stock
            ",
        )
        .bind(id)
        .bind(&product.name)
        .bind(product.category)
        .bind(product.unit_price)
        .bind(product.units_in_stock)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn update(&self, product: Product) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE catalog.product
            SET name = $2, category = $3, unit_price = $4, units_in_stock = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, category, unit_price, units_in_stock
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.category)
        .bind(product.unit_price)
        .bind(product.units_in_stock)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
