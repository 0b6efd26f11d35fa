//! Fuzzy, price-filtered product retrieval over the cached snapshot.

use crate::domain::product::ProductRecord;
use crate::pricing::{parse_price_window, PriceWindow};
use crate::similarity::similarity_ratio;

pub const MAX_RESULTS: usize = 10;
/// Strict lower bound: a candidate must score above this, not at it.
pub const SCORE_THRESHOLD: f64 = 0.3;

/// Rank snapshot records against a free-text query.
///
/// A price window parsed out of the query filters candidates before scoring.
/// Results are ordered by descending similarity; the sort is stable, so ties
/// keep snapshot order. At most [`MAX_RESULTS`] records come back, and an
/// empty result is a normal outcome the caller must handle.
pub fn find_products(query: &str, snapshot: &[ProductRecord]) -> Vec<ProductRecord> {
    let window = parse_price_window(query);
    let query_lower = query.to_lowercase();

    let mut candidates: Vec<(f64, &ProductRecord)> = Vec::new();
    for record in snapshot {
        if !price_admissible(record, window) {
            continue;
        }
        let score = similarity_ratio(&query_lower, &record.title.to_lowercase());
        if score > SCORE_THRESHOLD {
            candidates.push((score, record));
        }
    }

    candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    candidates.into_iter().take(MAX_RESULTS).map(|(_, record)| record.clone()).collect()
}

/// A record whose price does not parse is admissible even when a window is
/// present: unknown price, included by policy. The store-side fast path is
/// stricter; the mismatch is intentional slack for uneven catalog data.
fn price_admissible(record: &ProductRecord, window: Option<PriceWindow>) -> bool {
    match (window, record.price_value()) {
        (Some(window), Some(price)) => window.contains(price),
        _ => true,
    }
}
