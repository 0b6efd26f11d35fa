use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

use storebot_core::config::DatabaseConfig;

pub type DbPool = sqlx::SqlitePool;

/// Pool sized from the `[database]` config section.
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&config.url, config.max_connections, config.timeout_secs).await
}

pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                // the catalog is read-mostly: webhook handlers only SELECT,
                // writes come in batches from the out-of-process crawler.
                // WAL keeps those reads flowing during a crawl, and the busy
                // timeout rides out the crawler's insert transactions. The
                // single product table has no foreign keys to enforce.
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}
