use std::fmt;

use chrono::DateTime;

/// Highest active bid on the collection, already scaled by its decimals.
#[derive(Clone, Debug, PartialEq)]
pub struct Offer {
    pub value: f64,
    /// Currency label reported by the marketplace (e.g. "WETH").
    /// Empty when no offer beat the zero baseline.
    pub currency: String,
}

impl Offer {
    /// The best offer when the collection has no offers at all.
    pub fn zero() -> Self {
        Self {
            value: 0.0,
            currency: String::new(),
        }
    }
}

impl fmt::Display for Offer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.currency.is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.currency)
        }
    }
}

/// Most recent completed sale of any item in the collection.
#[derive(Clone, Debug, PartialEq)]
pub struct Sale {
    /// Price paid, scaled by the payment decimals.
    pub price: f64,
    /// Payment symbol (e.g. "ETH").
    pub currency: String,
    /// Unix timestamp (seconds) at which the order closed.
    pub closing_date: i64,
    pub order_hash: String,
}

impl Sale {
    /// Closing date rendered as `YYYY-MM-DD HH:MM:SS UTC`.
    pub fn closing_date_utc(&self) -> String {
        match DateTime::from_timestamp(self.closing_date, 0) {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            None => format!("{} (unix)", self.closing_date),
        }
    }
}

impl fmt::Display for Sale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Latest sale= {}{}, at date {}, order {}",
            self.price,
            self.currency,
            self.closing_date_utc(),
            self.order_hash
        )
    }
}

/// The three tracked market facts for the collection at one point in time.
///
/// Built whole once per cycle and never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    /// Cheapest active listing price. `None` if there are no listings or
    /// the listing could not be read.
    pub floor: Option<f64>,

    /// `None` only when the offers could never be fetched.
    pub best_offer: Option<Offer>,

    pub last_sale: Option<Sale>,
}

/// Renders an optional field for humans; absent values read as "none".
pub fn describe<T: fmt::Display>(value: Option<&T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "none".to_string(),
    }
}
