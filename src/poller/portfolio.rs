//! Polls the holdings endpoint every 30 seconds.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::interval;
use tracing::{info, warn};

use crate::api::types::holdings_identity;
use crate::api::Backend;
use crate::poller::UiEvent;
use crate::state::fetch::{FetchState, QueryKey, QueryValue};
use crate::state::query_cache::QueryCache;

const PORTFOLIO_REFRESH: Duration = Duration::from_secs(30);

pub async fn run(
    backend: Arc<dyn Backend>,
    cache: QueryCache,
    identity_tx: watch::Sender<Vec<String>>,
    tx: mpsc::Sender<UiEvent>,
) {
    let mut ticker = interval(PORTFOLIO_REFRESH);
    info!("portfolio poller started");

    loop {
        ticker.tick().await;

        let token = cache.begin(&QueryKey::Portfolio);
        match backend.portfolio().await {
            Ok(holdings) => {
                let identity = holdings_identity(&holdings);
                info!(holdings = holdings.len(), "portfolio refreshed");
                if cache.settle(
                    &QueryKey::Portfolio,
                    token,
                    FetchState::Ready(QueryValue::Portfolio(holdings)),
                    PORTFOLIO_REFRESH,
                ) {
                    // Wakes the price poller when the holdings identity changes.
                    identity_tx.send_if_modified(|current| {
                        if *current == identity {
                            false
                        } else {
                            *current = identity;
                            true
                        }
                    });
                }
            }
            Err(err) => {
                warn!(error = %err, "portfolio fetch failed");
                cache.settle(
                    &QueryKey::Portfolio,
                    token,
                    FetchState::Failed(err.to_string()),
                    PORTFOLIO_REFRESH,
                );
            }
        }

        if tx.send(UiEvent::Settled(QueryKey::Portfolio)).await.is_err() {
            info!("event channel closed, portfolio poller shutting down");
            return;
        }
    }
}
