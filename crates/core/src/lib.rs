pub mod config;
pub mod content;
pub mod domain;
pub mod errors;
pub mod matcher;
pub mod pricing;
pub mod similarity;

pub use content::{ContentCache, ContentSnapshot, ContentSource, EXCERPT_MAX_CHARS};
pub use domain::product::{parse_price, ProductRecord};
pub use errors::{ContentError, InferenceError};
pub use matcher::{find_products, MAX_RESULTS, SCORE_THRESHOLD};
pub use pricing::{parse_price_window, PriceWindow};
pub use similarity::similarity_ratio;
