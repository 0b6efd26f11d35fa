//! Demo catalog rows for local runs and tests. The real catalog is written
//! by the crawler; these fixtures stand in when it has not run yet.

use crate::catalog::RepositoryError;
use crate::DbPool;

const DEMO_PRODUCTS: &[(&str, &str, &str)] = &[
    ("Air Max 90 Black Red", "2500", "/products/air-max-90-black-red"),
    ("Gel Keyano 30 Grey", "3200", "/products/gel-keyano-30-grey"),
    ("Fresh Foam X More Trail V3", "3900", "/products/fresh-foam-x-more-trail-v3"),
    ("Court Classic White", "1800", "/products/court-classic-white"),
    ("Slide Box Beige Black", "9000", "/products/slide-box-beige-black"),
    ("Retropy E5 Camel", "call for price", "/products/retropy-e5-camel"),
];

pub async fn seed_demo_catalog(pool: &DbPool) -> Result<u64, RepositoryError> {
    let mut inserted = 0;
    for (title, price, link) in DEMO_PRODUCTS {
        let result = sqlx::query(
            "INSERT INTO product (title, price, image_url, product_link) VALUES (?, ?, NULL, ?)",
        )
        .bind(title)
        .bind(price)
        .bind(link)
        .execute(pool)
        .await?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

pub async fn catalog_is_empty(pool: &DbPool) -> Result<bool, RepositoryError> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM product").fetch_one(pool).await?;
    Ok(count == 0)
}
