//! Wire types for the backend's JSON responses.
//!
//! Balances and prices arrive as decimal strings and stay that way here;
//! conversion to `Decimal` happens where values are computed for display.

use std::collections::HashMap;

use serde::Deserialize;

/// One cryptocurrency holding in the user's portfolio.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Holding {
    pub currency: String,
    pub balance: String,
    pub available: String,
}

/// Spot price of one currency quoted in GBP.
///
/// The backend has a minimal variant that sends only `price` and `time`,
/// so the 24h fields are optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpotPrice {
    pub price: String,
    pub time: String,
    #[serde(default)]
    pub change_24h: Option<f64>,
    #[serde(default)]
    pub price_24h_ago: Option<String>,
}

/// One hourly OHLCV candle from the historical endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Candle {
    pub time: String,
    pub low: String,
    pub high: String,
    pub open: String,
    pub close: String,
    pub volume: String,
}

/// Payload of the recommendations endpoint: opaque newline-delimited text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecommendationsResponse {
    pub recommendations: String,
}

/// Aggregated per-currency price result for one fetch cycle.
///
/// Prices are keyed by currency symbol rather than by position in the
/// holdings sequence, and each symbol carries its own outcome, so one
/// failing request never blanks the other cards.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBook {
    /// Ordered symbol list of the holdings this book was fetched for.
    /// A book whose identity no longer matches the cached holdings is stale
    /// and must be discarded, not stored.
    pub identity: Vec<String>,
    pub by_symbol: HashMap<String, Result<SpotPrice, String>>,
}

impl PriceBook {
    pub fn outcome(&self, symbol: &str) -> Option<&Result<SpotPrice, String>> {
        self.by_symbol.get(symbol)
    }
}

/// The ordered symbol list that identifies a holdings sequence.
pub fn holdings_identity(holdings: &[Holding]) -> Vec<String> {
    holdings.iter().map(|h| h.currency.clone()).collect()
}
