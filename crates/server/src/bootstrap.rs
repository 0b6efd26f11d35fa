use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use storebot_agent::{BoundedInvoker, GeminiClient};
use storebot_core::config::{AppConfig, ConfigError};
use storebot_core::{ContentError, ContentSource, ProductRecord};
use storebot_db::{
    catalog_is_empty, connect, migrations, seed_demo_catalog, CatalogStore, DbPool,
    RepositoryError, SqlCatalog,
};

use crate::dispatch::Dispatcher;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub dispatcher: Arc<Dispatcher>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("demo catalog seeding failed: {0}")]
    Seed(#[source] RepositoryError),
}

/// Content for the cache comes from two places: the product table, and a
/// flat text file written by the out-of-process page crawler. A missing
/// pages file is a valid empty site, not an error.
pub struct StoreContentSource {
    catalog: Arc<dyn CatalogStore>,
    pages_path: PathBuf,
}

#[async_trait]
impl ContentSource for StoreContentSource {
    async fn site_text(&self) -> Result<String, ContentError> {
        Ok(tokio::fs::read_to_string(&self.pages_path).await.unwrap_or_default())
    }

    async fn all_products(&self) -> Result<Vec<ProductRecord>, ContentError> {
        self.catalog.list_all().await.map_err(|error| ContentError::Source(error.to_string()))
    }
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    if config.database.seed_demo && catalog_is_empty(&db_pool).await.map_err(BootstrapError::Seed)?
    {
        let inserted = seed_demo_catalog(&db_pool).await.map_err(BootstrapError::Seed)?;
        info!(
            event_name = "system.bootstrap.demo_catalog_seeded",
            correlation_id = "bootstrap",
            inserted,
            "seeded demo product catalog into empty database"
        );
    }

    let catalog: Arc<dyn CatalogStore> = Arc::new(SqlCatalog::new(db_pool.clone()));
    let source = Arc::new(StoreContentSource {
        catalog: Arc::clone(&catalog),
        pages_path: config.content.pages_path.clone(),
    });
    let invoker = BoundedInvoker::new(
        Arc::new(GeminiClient::new(&config.gemini)),
        config.store.name.clone(),
        config.store.currency_prefix.clone(),
    );
    let dispatcher = Arc::new(Dispatcher::new(
        catalog,
        source,
        invoker,
        config.store.clone(),
        Duration::from_secs(config.dispatch.llm_timeout_secs),
    ));

    info!(
        event_name = "system.bootstrap.dispatcher_ready",
        correlation_id = "bootstrap",
        llm_timeout_secs = config.dispatch.llm_timeout_secs,
        gemini_key_configured = config.gemini.api_key.is_some(),
        "intent dispatcher assembled"
    );

    Ok(Application { config, db_pool, dispatcher })
}

#[cfg(test)]
mod tests {
    use storebot_core::config::{AppConfig, ConfigOverrides, LoadOptions};
    use storebot_db::CatalogStore;

    use super::bootstrap_with_config;

    // each test gets its own named in-memory database; an anonymous shared
    // cache would be one database for the whole test process
    fn in_memory_config(db_name: &str) -> AppConfig {
        AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(format!("sqlite:file:{db_name}?mode=memory&cache=shared")),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("default config with an in-memory database should load")
    }

    #[tokio::test]
    async fn bootstrap_migrates_and_seeds_an_empty_database() {
        let mut config = in_memory_config("bootstrap_seeded");
        config.database.seed_demo = true;

        let app = bootstrap_with_config(config).await.expect("bootstrap should succeed");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'product'",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("expected the product table after bootstrap");
        assert_eq!(table_count, 1);

        let (product_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM product")
            .fetch_one(&app.db_pool)
            .await
            .expect("seeded table should be queryable");
        assert!(product_count > 0, "seeding should populate an empty catalog");
    }

    #[tokio::test]
    async fn bootstrap_skips_seeding_when_disabled() {
        let mut config = in_memory_config("bootstrap_unseeded");
        config.database.seed_demo = false;

        let app = bootstrap_with_config(config).await.expect("bootstrap should succeed");

        let (product_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM product")
            .fetch_one(&app.db_pool)
            .await
            .expect("product table should exist even without seeding");
        assert_eq!(product_count, 0);
    }

    #[tokio::test]
    async fn missing_pages_file_reads_as_empty_site_text() {
        use std::sync::Arc;

        use storebot_core::ContentSource;
        use storebot_db::InMemoryCatalog;

        use super::StoreContentSource;

        let source = StoreContentSource {
            catalog: Arc::new(InMemoryCatalog::with_products(Vec::new())),
            pages_path: "definitely/not/a/real/pages.txt".into(),
        };

        assert_eq!(source.site_text().await.expect("missing file is not an error"), "");
        assert!(source.all_products().await.expect("empty catalog lists fine").is_empty());
    }

    #[tokio::test]
    async fn seeded_catalog_is_visible_through_the_store_trait() {
        let mut config = in_memory_config("bootstrap_store_trait");
        config.database.seed_demo = true;

        let app = bootstrap_with_config(config).await.expect("bootstrap should succeed");
        let catalog = storebot_db::SqlCatalog::new(app.db_pool.clone());

        let products = catalog.list_all().await.expect("listing should succeed");
        assert!(!products.is_empty());
        assert!(products.iter().all(|product| !product.title.is_empty()));
    }
}
