//! Process-wide query cache.
//!
//! An explicit key → cached-value store shared by the pollers and the UI.
//! Each entry carries the time it settled and a TTL equal to the query's
//! refresh interval. Writes are guarded by a per-key epoch: a settle whose
//! token is no longer current is ignored, so an in-flight response for a
//! superseded fetch can never overwrite a fresher one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::api::types::{Candle, Holding, PriceBook, RecommendationsResponse};
use crate::state::fetch::{FetchState, QueryKey, QueryValue};

#[derive(Debug)]
struct Slot {
    state: FetchState<QueryValue>,
    epoch: u64,
    settled_at: Option<Instant>,
    ttl: Duration,
}

/// Cheap to clone (just an Arc bump).
#[derive(Clone, Debug, Default)]
pub struct QueryCache {
    inner: Arc<DashMap<QueryKey, Slot>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch cycle for `key` and return the epoch token the eventual
    /// settle must present. A later `begin` on the same key invalidates any
    /// token handed out before it.
    pub fn begin(&self, key: &QueryKey) -> u64 {
        let mut slot = self.inner.entry(key.clone()).or_insert_with(|| Slot {
            state: FetchState::Pending,
            epoch: 0,
            settled_at: None,
            ttl: Duration::ZERO,
        });
        slot.epoch += 1;
        slot.epoch
    }

    /// Settle the cycle identified by `token`. Returns false (and leaves the
    /// entry untouched) when a newer cycle has begun since the token was
    /// handed out.
    pub fn settle(
        &self,
        key: &QueryKey,
        token: u64,
        state: FetchState<QueryValue>,
        ttl: Duration,
    ) -> bool {
        let Some(mut slot) = self.inner.get_mut(key) else {
            return false;
        };
        if slot.epoch != token {
            debug!(?key, token, current = slot.epoch, "ignoring stale settle");
            return false;
        }
        slot.state = state;
        slot.settled_at = Some(Instant::now());
        slot.ttl = ttl;
        true
    }

    /// Current state of a query; `Pending` when nothing has settled yet.
    pub fn get(&self, key: &QueryKey) -> FetchState<QueryValue> {
        self.inner
            .get(key)
            .map(|slot| slot.state.clone())
            .unwrap_or(FetchState::Pending)
    }

    /// Whether the entry has settled within its TTL. A fresh entry does not
    /// need refetching even if a poll tick comes due.
    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.inner
            .get(key)
            .and_then(|slot| slot.settled_at.map(|at| at.elapsed() < slot.ttl))
            .unwrap_or(false)
    }

    // ── Typed accessors ──────────────────────────────────────────────
    // Each key only ever stores its own variant, so the fallthrough arms
    // are unreachable in practice and simply report Pending.

    pub fn portfolio(&self) -> FetchState<Vec<Holding>> {
        match self.get(&QueryKey::Portfolio) {
            FetchState::Ready(QueryValue::Portfolio(holdings)) => FetchState::Ready(holdings),
            FetchState::Failed(reason) => FetchState::Failed(reason),
            _ => FetchState::Pending,
        }
    }

    pub fn prices(&self) -> FetchState<PriceBook> {
        match self.get(&QueryKey::Prices) {
            FetchState::Ready(QueryValue::Prices(book)) => FetchState::Ready(book),
            FetchState::Failed(reason) => FetchState::Failed(reason),
            _ => FetchState::Pending,
        }
    }

    pub fn recommendations(&self) -> FetchState<RecommendationsResponse> {
        match self.get(&QueryKey::Recommendations) {
            FetchState::Ready(QueryValue::Recommendations(payload)) => FetchState::Ready(payload),
            FetchState::Failed(reason) => FetchState::Failed(reason),
            _ => FetchState::Pending,
        }
    }

    pub fn history(&self, symbol: &str) -> FetchState<Vec<Candle>> {
        match self.get(&QueryKey::History(symbol.to_string())) {
            FetchState::Ready(QueryValue::History(candles)) => FetchState::Ready(candles),
            FetchState::Failed(reason) => FetchState::Failed(reason),
            _ => FetchState::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holdings() -> Vec<Holding> {
        vec![Holding {
            currency: "BTC".to_string(),
            balance: "0.5".to_string(),
            available: "0.5".to_string(),
        }]
    }

    #[test]
    fn unsettled_key_reads_as_pending() {
        let cache = QueryCache::new();
        assert_eq!(cache.portfolio(), FetchState::Pending);

        cache.begin(&QueryKey::Portfolio);
        assert_eq!(cache.portfolio(), FetchState::Pending);
    }

    #[test]
    fn settle_stores_and_get_returns_it() {
        let cache = QueryCache::new();
        let token = cache.begin(&QueryKey::Portfolio);
        let stored = cache.settle(
            &QueryKey::Portfolio,
            token,
            FetchState::Ready(QueryValue::Portfolio(holdings())),
            Duration::from_secs(30),
        );
        assert!(stored);
        assert_eq!(cache.portfolio(), FetchState::Ready(holdings()));
        assert!(cache.is_fresh(&QueryKey::Portfolio));
    }

    #[test]
    fn stale_token_settle_is_ignored() {
        let cache = QueryCache::new();
        let old = cache.begin(&QueryKey::Portfolio);
        let new = cache.begin(&QueryKey::Portfolio);

        let stored = cache.settle(
            &QueryKey::Portfolio,
            old,
            FetchState::Failed("stale response".to_string()),
            Duration::from_secs(30),
        );
        assert!(!stored);
        assert_eq!(cache.portfolio(), FetchState::Pending);

        let stored = cache.settle(
            &QueryKey::Portfolio,
            new,
            FetchState::Ready(QueryValue::Portfolio(holdings())),
            Duration::from_secs(30),
        );
        assert!(stored);
        assert_eq!(cache.portfolio(), FetchState::Ready(holdings()));
    }

    #[test]
    fn each_settle_replaces_the_prior_value_wholesale() {
        let cache = QueryCache::new();
        let token = cache.begin(&QueryKey::Portfolio);
        cache.settle(
            &QueryKey::Portfolio,
            token,
            FetchState::Ready(QueryValue::Portfolio(holdings())),
            Duration::from_secs(30),
        );

        let token = cache.begin(&QueryKey::Portfolio);
        cache.settle(
            &QueryKey::Portfolio,
            token,
            FetchState::Failed("503".to_string()),
            Duration::from_secs(30),
        );
        assert_eq!(cache.portfolio(), FetchState::Failed("503".to_string()));
    }

    #[test]
    fn zero_ttl_entry_is_never_fresh() {
        let cache = QueryCache::new();
        let token = cache.begin(&QueryKey::Prices);
        cache.settle(
            &QueryKey::Prices,
            token,
            FetchState::Failed("boom".to_string()),
            Duration::ZERO,
        );
        assert!(!cache.is_fresh(&QueryKey::Prices));
    }

    #[test]
    fn history_keys_are_per_symbol() {
        let cache = QueryCache::new();
        let token = cache.begin(&QueryKey::History("BTC".to_string()));
        cache.settle(
            &QueryKey::History("BTC".to_string()),
            token,
            FetchState::Ready(QueryValue::History(Vec::new())),
            Duration::from_secs(300),
        );
        assert!(cache.history("BTC").ready().is_some());
        assert_eq!(cache.history("ETH"), FetchState::Pending);
    }
}
