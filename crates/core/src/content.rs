//! Process-wide, lazily populated cache of site content and catalog state.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::product::ProductRecord;
use crate::errors::ContentError;

/// Hard character budget for the site excerpt. This exists for prompt size,
/// not correctness; the cut is a plain character count, not sentence-aware.
pub const EXCERPT_MAX_CHARS: usize = 2000;

/// Immutable once built. A fresh process or an explicit
/// [`ContentCache::invalidate`] is the only way to refresh it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentSnapshot {
    pub site_excerpt: String,
    /// One brand token per product (first whitespace-delimited token of the
    /// title), deduplicated. No ordering guarantee.
    pub brands: HashSet<String>,
    /// Catalog records in catalog order.
    pub products: Vec<ProductRecord>,
}

/// Where the expensive cold-start reads come from: the catalog store plus the
/// crawler-produced site text in production, fixtures in tests.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Full site text. An absent resource is a valid low-information state;
    /// implementations return an empty string rather than erroring.
    async fn site_text(&self) -> Result<String, ContentError>;
    async fn all_products(&self) -> Result<Vec<ProductRecord>, ContentError>;
}

#[derive(Default)]
pub struct ContentCache {
    slot: RwLock<Option<Arc<ContentSnapshot>>>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute-if-absent. Concurrent cold-start callers either block briefly
    /// on the write lock or redundantly build the same immutable value; no
    /// caller ever observes a partially populated snapshot.
    pub async fn snapshot(
        &self,
        source: &dyn ContentSource,
    ) -> Result<Arc<ContentSnapshot>, ContentError> {
        if let Some(snapshot) = self.slot.read().await.clone() {
            return Ok(snapshot);
        }

        let site_text = source.site_text().await?;
        let products = source.all_products().await?;
        let built = Arc::new(build_snapshot(site_text, products));

        let mut slot = self.slot.write().await;
        if let Some(existing) = slot.clone() {
            // another caller won the cold-start race; keep its value
            return Ok(existing);
        }
        *slot = Some(built.clone());
        Ok(built)
    }

    pub async fn site_excerpt(&self, source: &dyn ContentSource) -> Result<String, ContentError> {
        Ok(self.snapshot(source).await?.site_excerpt.clone())
    }

    pub async fn brands(
        &self,
        source: &dyn ContentSource,
    ) -> Result<HashSet<String>, ContentError> {
        Ok(self.snapshot(source).await?.brands.clone())
    }

    pub async fn products(
        &self,
        source: &dyn ContentSource,
    ) -> Result<Vec<ProductRecord>, ContentError> {
        Ok(self.snapshot(source).await?.products.clone())
    }

    /// Testability hook. Production code never calls this; the snapshot
    /// otherwise lives for the whole process.
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }
}

fn build_snapshot(site_text: String, products: Vec<ProductRecord>) -> ContentSnapshot {
    let site_excerpt: String = site_text.chars().take(EXCERPT_MAX_CHARS).collect();
    let brands = products.iter().filter_map(ProductRecord::brand).map(str::to_owned).collect();
    ContentSnapshot { site_excerpt, brands, products }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::domain::product::ProductRecord;
    use crate::errors::ContentError;

    use super::{ContentCache, ContentSource, EXCERPT_MAX_CHARS};

    struct CountingSource {
        text: String,
        products: Vec<ProductRecord>,
        reads: AtomicUsize,
    }

    impl CountingSource {
        fn new(text: &str, products: Vec<ProductRecord>) -> Self {
            Self { text: text.to_string(), products, reads: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl ContentSource for CountingSource {
        async fn site_text(&self) -> Result<String, ContentError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.clone())
        }

        async fn all_products(&self) -> Result<Vec<ProductRecord>, ContentError> {
            Ok(self.products.clone())
        }
    }

    fn record(title: &str) -> ProductRecord {
        ProductRecord {
            title: title.to_string(),
            price: "1000".to_string(),
            image_url: None,
            product_link: "https://shop.example.com/p/1".to_string(),
        }
    }

    #[tokio::test]
    async fn repeated_reads_are_memoized_and_byte_identical() {
        let cache = ContentCache::new();
        let source = CountingSource::new("welcome to the shop", vec![record("Nike Air")]);

        let first = cache.site_excerpt(&source).await.expect("excerpt");
        let second = cache.site_excerpt(&source).await.expect("excerpt");

        assert_eq!(first, second);
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn excerpt_is_cut_at_the_character_budget() {
        let cache = ContentCache::new();
        let long_text = "é".repeat(EXCERPT_MAX_CHARS + 500);
        let source = CountingSource::new(&long_text, vec![]);

        let excerpt = cache.site_excerpt(&source).await.expect("excerpt");
        assert_eq!(excerpt.chars().count(), EXCERPT_MAX_CHARS);
    }

    #[tokio::test]
    async fn brands_are_deduplicated_first_title_tokens() {
        let cache = ContentCache::new();
        let source = CountingSource::new(
            "",
            vec![record("Nike Air Zoom"), record("Nike Court"), record("Adidas Gazelle")],
        );

        let brands = cache.brands(&source).await.expect("brands");
        assert_eq!(brands.len(), 2);
        assert!(brands.contains("Nike"));
        assert!(brands.contains("Adidas"));
    }

    #[tokio::test]
    async fn invalidate_forces_a_fresh_read() {
        let cache = ContentCache::new();
        let source = CountingSource::new("text", vec![]);

        cache.snapshot(&source).await.expect("populate");
        cache.invalidate().await;
        cache.snapshot(&source).await.expect("repopulate");

        assert_eq!(source.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_cold_start_never_yields_partial_snapshots() {
        let cache = Arc::new(ContentCache::new());
        let source = Arc::new(CountingSource::new("shared", vec![record("Nike Air")]));

        let a = {
            let (cache, source) = (cache.clone(), source.clone());
            tokio::spawn(async move { cache.snapshot(source.as_ref()).await })
        };
        let b = {
            let (cache, source) = (cache.clone(), source.clone());
            tokio::spawn(async move { cache.snapshot(source.as_ref()).await })
        };

        let first = a.await.expect("join").expect("snapshot");
        let second = b.await.expect("join").expect("snapshot");

        assert_eq!(first, second);
        assert_eq!(first.site_excerpt, "shared");
        assert_eq!(first.products.len(), 1);
        // redundant computation is allowed during the race, corruption is not
        assert!(source.reads.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn empty_site_text_is_a_valid_state() {
        let cache = ContentCache::new();
        let source = CountingSource::new("", vec![record("Nike Air")]);

        let excerpt = cache.site_excerpt(&source).await.expect("excerpt");
        assert!(excerpt.is_empty());
    }
}
