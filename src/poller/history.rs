//! On-demand fetch of 24h price history for the detail popup.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::warn;

use crate::api::Backend;
use crate::poller::UiEvent;
use crate::state::fetch::{FetchState, QueryKey, QueryValue};
use crate::state::query_cache::QueryCache;

const HISTORY_TTL: Duration = Duration::from_secs(5 * 60);

/// Fetch history for one symbol unless a fresh entry is already cached.
/// Fired when the detail popup opens; settles like every other query.
pub fn spawn_fetch(
    backend: Arc<dyn Backend>,
    cache: QueryCache,
    symbol: String,
    tx: mpsc::Sender<UiEvent>,
) {
    tokio::spawn(async move {
        let key = QueryKey::History(symbol.clone());
        if cache.is_fresh(&key) {
            return;
        }

        let token = cache.begin(&key);
        let state = match backend.price_history(&symbol).await {
            Ok(candles) => FetchState::Ready(QueryValue::History(candles)),
            Err(err) => {
                warn!(error = %err, %symbol, "history fetch failed");
                FetchState::Failed(err.to_string())
            }
        };

        if cache.settle(&key, token, state, HISTORY_TTL) {
            let _ = tx.send(UiEvent::Settled(key)).await;
        }
    });
}
