pub mod catalog;
pub mod connection;
pub mod fixtures;
pub mod migrations;

pub use catalog::{CatalogStore, InMemoryCatalog, RepositoryError, SqlCatalog};
pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{catalog_is_empty, seed_demo_catalog};
