//! Polls the per-currency price endpoint for every holding.
//!
//! Runs only once holdings exist. Refreshes every 10 seconds and
//! immediately whenever the holdings identity changes.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{mpsc, watch};
use tokio::time::interval;
use tracing::{debug, info};

use crate::api::types::{holdings_identity, Holding, PriceBook};
use crate::api::Backend;
use crate::poller::UiEvent;
use crate::state::fetch::{FetchState, QueryKey, QueryValue};
use crate::state::query_cache::QueryCache;

const PRICE_REFRESH: Duration = Duration::from_secs(10);

pub async fn run(
    backend: Arc<dyn Backend>,
    cache: QueryCache,
    mut identity_rx: watch::Receiver<Vec<String>>,
    tx: mpsc::Sender<UiEvent>,
) {
    let mut ticker = interval(PRICE_REFRESH);
    info!("price poller started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // An identity-triggered refresh may have settled moments ago.
                if cache.is_fresh(&QueryKey::Prices) {
                    continue;
                }
            }
            changed = identity_rx.changed() => {
                if changed.is_err() {
                    info!("holdings watch closed, price poller shutting down");
                    return;
                }
                // Refresh immediately on an identity change; push the next
                // scheduled tick out a full interval.
                ticker.reset();
            }
        }

        let holdings = match cache.portfolio() {
            FetchState::Ready(holdings) if !holdings.is_empty() => holdings,
            _ => continue,
        };

        let token = cache.begin(&QueryKey::Prices);
        let book = fetch_book(backend.as_ref(), &holdings).await;

        let current = identity_rx.borrow().clone();
        if !store_book(&cache, token, book, &current) {
            continue;
        }

        if tx.send(UiEvent::Settled(QueryKey::Prices)).await.is_err() {
            info!("event channel closed, price poller shutting down");
            return;
        }
    }
}

/// Fetch one spot price per holding, all concurrently, and re-key the
/// results by currency symbol. Each symbol carries its own outcome, so one
/// bad symbol never blanks the rest of the book.
pub async fn fetch_book(backend: &dyn Backend, holdings: &[Holding]) -> PriceBook {
    let identity = holdings_identity(holdings);
    let outcomes = join_all(holdings.iter().map(|holding| async move {
        let outcome = backend
            .spot_price(&holding.currency)
            .await
            .map_err(|err| err.to_string());
        (holding.currency.clone(), outcome)
    }))
    .await;

    PriceBook { identity, by_symbol: outcomes.into_iter().collect() }
}

/// Store a fetched book unless the holdings identity moved underneath it.
fn store_book(
    cache: &QueryCache,
    token: u64,
    book: PriceBook,
    current_identity: &[String],
) -> bool {
    if book.identity != current_identity {
        debug!("discarding price book fetched for outdated holdings");
        return false;
    }
    cache.settle(
        &QueryKey::Prices,
        token,
        FetchState::Ready(QueryValue::Prices(book)),
        PRICE_REFRESH,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::api::types::{Candle, RecommendationsResponse, SpotPrice};
    use crate::error::ApiError;

    struct StaggeredBackend;

    fn price(value: &str) -> SpotPrice {
        SpotPrice {
            price: value.to_string(),
            time: "2025-01-02T03:04:05".to_string(),
            change_24h: Some(1.5),
            price_24h_ago: None,
        }
    }

    #[async_trait]
    impl Backend for StaggeredBackend {
        async fn portfolio(&self) -> Result<Vec<Holding>, ApiError> {
            Ok(Vec::new())
        }

        async fn spot_price(&self, symbol: &str) -> Result<SpotPrice, ApiError> {
            // BTC resolves last, ETH first; the keyed book must not care.
            let (delay_ms, result) = match symbol {
                "BTC" => (50, Ok(price("40000.00"))),
                "ETH" => (5, Ok(price("2000.00"))),
                other => {
                    (20, Err(ApiError::Status { status: 500, body: format!("no price for {other}") }))
                }
            };
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            result
        }

        async fn price_history(&self, _symbol: &str) -> Result<Vec<Candle>, ApiError> {
            Ok(Vec::new())
        }

        async fn recommendations(&self) -> Result<RecommendationsResponse, ApiError> {
            Err(ApiError::Status { status: 500, body: String::new() })
        }
    }

    fn holding(currency: &str) -> Holding {
        Holding {
            currency: currency.to_string(),
            balance: "1".to_string(),
            available: "1".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn book_is_keyed_by_symbol_regardless_of_completion_order() {
        let holdings = vec![holding("BTC"), holding("ETH")];
        let book = fetch_book(&StaggeredBackend, &holdings).await;

        assert_eq!(book.identity, vec!["BTC".to_string(), "ETH".to_string()]);
        assert_eq!(book.outcome("BTC").unwrap().as_ref().unwrap().price, "40000.00");
        assert_eq!(book.outcome("ETH").unwrap().as_ref().unwrap().price, "2000.00");
    }

    #[tokio::test(start_paused = true)]
    async fn one_failing_symbol_leaves_the_rest_intact() {
        let holdings = vec![holding("BTC"), holding("XRP")];
        let book = fetch_book(&StaggeredBackend, &holdings).await;

        assert!(book.outcome("BTC").unwrap().is_ok());
        assert!(book.outcome("XRP").unwrap().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn book_for_outdated_holdings_is_discarded() {
        let cache = QueryCache::new();
        let holdings = vec![holding("BTC")];
        let token = cache.begin(&QueryKey::Prices);
        let book = fetch_book(&StaggeredBackend, &holdings).await;

        // Holdings moved on while the book was in flight.
        let newer = vec!["BTC".to_string(), "ETH".to_string()];
        assert!(!store_book(&cache, token, book.clone(), &newer));
        assert_eq!(cache.prices(), FetchState::Pending);

        assert!(store_book(&cache, token, book, &["BTC".to_string()]));
        assert!(cache.prices().ready().is_some());
    }
}
