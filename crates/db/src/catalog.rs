use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use thiserror::Error;
use tokio::sync::RwLock;

use storebot_core::domain::product::ProductRecord;

use crate::DbPool;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Read-only access to the product catalog. Rows are written by the
/// out-of-process crawler; this service never mutates them.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Every product in catalog order.
    async fn list_all(&self) -> Result<Vec<ProductRecord>, RepositoryError>;

    /// Strict store-side range filter on the numeric price value. Rows whose
    /// price does not read as a number fall outside every window here; the
    /// in-memory matcher is deliberately more lenient about those.
    async fn find_in_price_range(
        &self,
        low: Decimal,
        high: Decimal,
        limit: u32,
    ) -> Result<Vec<ProductRecord>, RepositoryError>;
}

pub struct SqlCatalog {
    pool: DbPool,
}

impl SqlCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for SqlCatalog {
    async fn list_all(&self) -> Result<Vec<ProductRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT title, price, image_url, product_link FROM product ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(record_from_row).collect())
    }

    async fn find_in_price_range(
        &self,
        low: Decimal,
        high: Decimal,
        limit: u32,
    ) -> Result<Vec<ProductRecord>, RepositoryError> {
        // the GLOB guard keeps non-numeric prices out; CAST alone would fold
        // them to 0.0 and let them sneak into windows that start at zero
        let rows = sqlx::query(
            "SELECT title, price, image_url, product_link FROM product \
             WHERE price GLOB '[0-9]*' \
               AND CAST(price AS REAL) BETWEEN CAST(? AS REAL) AND CAST(? AS REAL) \
             ORDER BY id LIMIT ?",
        )
        .bind(low.to_string())
        .bind(high.to_string())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(record_from_row).collect())
    }
}

fn record_from_row(row: SqliteRow) -> ProductRecord {
    ProductRecord {
        title: row.get("title"),
        price: row.get("price"),
        image_url: row.get("image_url"),
        product_link: row.get("product_link"),
    }
}

/// Catalog backed by a plain vector, for tests and offline runs.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: RwLock<Vec<ProductRecord>>,
}

impl InMemoryCatalog {
    pub fn with_products(products: Vec<ProductRecord>) -> Self {
        Self { products: RwLock::new(products) }
    }

    pub async fn push(&self, record: ProductRecord) {
        self.products.write().await.push(record);
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn list_all(&self) -> Result<Vec<ProductRecord>, RepositoryError> {
        Ok(self.products.read().await.clone())
    }

    async fn find_in_price_range(
        &self,
        low: Decimal,
        high: Decimal,
        limit: u32,
    ) -> Result<Vec<ProductRecord>, RepositoryError> {
        // mirrors the SQL semantics: unparsable prices match no window
        let products = self.products.read().await;
        Ok(products
            .iter()
            .filter(|record| {
                record.price_value().is_some_and(|price| low <= price && price <= high)
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
