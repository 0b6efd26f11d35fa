use std::str::FromStr;

use rust_decimal::Decimal;

/// Inclusive price range extracted from free text. Bounds are taken in order
/// of appearance and are deliberately not validated against each other; an
/// inverted window simply matches nothing downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceWindow {
    pub low: Decimal,
    pub high: Decimal,
}

impl PriceWindow {
    pub fn contains(&self, price: Decimal) -> bool {
        self.low <= price && price <= self.high
    }
}

/// Extract a price window from a user query.
///
/// Every run of ASCII digits counts as one numeric token. Fewer than two
/// tokens means no window; otherwise the first two become `(low, high)`
/// regardless of magnitude ordering. A run too long to represent saturates
/// to `Decimal::MAX` instead of dropping out; it still claims its position,
/// and a bound that large just makes the window degenerate.
pub fn parse_price_window(query: &str) -> Option<PriceWindow> {
    let mut numbers: Vec<Decimal> = Vec::with_capacity(2);
    let mut run = String::new();

    // trailing space flushes a run that ends the string
    for ch in query.chars().chain(std::iter::once(' ')) {
        if ch.is_ascii_digit() {
            run.push(ch);
            continue;
        }
        if !run.is_empty() {
            // the run is all digits, so the only parse failure is overflow
            numbers.push(Decimal::from_str(&run).unwrap_or(Decimal::MAX));
            if numbers.len() == 2 {
                break;
            }
            run.clear();
        }
    }

    match numbers[..] {
        [low, high] => Some(PriceWindow { low, high }),
        _ => None,
    }
}
