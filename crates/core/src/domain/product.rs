use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Read-only view of one catalog entry. The catalog is owned by the store;
/// the core only ever holds snapshots of it and never mutates a row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub title: String,
    /// Raw price text as it arrived from the crawler. Catalog data quality
    /// is uneven; some rows carry values that do not read as numbers.
    pub price: String,
    pub image_url: Option<String>,
    pub product_link: String,
}

impl ProductRecord {
    /// Lenient numeric view of the price. `None` is a data-quality state,
    /// not an error; callers decide what an unparsable price means.
    pub fn price_value(&self) -> Option<Decimal> {
        parse_price(&self.price)
    }

    /// First whitespace-delimited token of the title, treated as the brand.
    pub fn brand(&self) -> Option<&str> {
        self.title.split_whitespace().next()
    }
}

pub fn parse_price(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{parse_price, ProductRecord};

    fn record(title: &str, price: &str) -> ProductRecord {
        ProductRecord {
            title: title.to_string(),
            price: price.to_string(),
            image_url: None,
            product_link: "https://shop.example.com/p/1".to_string(),
        }
    }

    #[test]
    fn price_value_parses_plain_and_decimal_amounts() {
        assert_eq!(record("A", "2500").price_value(), Some(Decimal::new(2500, 0)));
        assert_eq!(record("A", " 2500.50 ").price_value(), Some(Decimal::new(250_050, 2)));
    }

    #[test]
    fn price_value_is_none_for_unparsable_text() {
        assert_eq!(record("A", "call for price").price_value(), None);
        assert_eq!(record("A", "").price_value(), None);
    }

    #[test]
    fn brand_is_first_title_token() {
        assert_eq!(record("Nike Air Zoom", "1").brand(), Some("Nike"));
        assert_eq!(record("   ", "1").brand(), None);
    }

    #[test]
    fn parse_price_rejects_currency_prefixes() {
        // the crawler strips currency symbols; anything left over stays raw
        assert_eq!(parse_price("Rs. 2500"), None);
    }
}
