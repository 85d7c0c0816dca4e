//! Polls the recommendations endpoint every 5 minutes, retrying once per
//! cycle before the failure is surfaced.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{info, warn};

use crate::api::types::RecommendationsResponse;
use crate::api::Backend;
use crate::error::ApiError;
use crate::poller::UiEvent;
use crate::state::fetch::{FetchState, QueryKey, QueryValue};
use crate::state::query_cache::QueryCache;

const RECOMMENDATIONS_REFRESH: Duration = Duration::from_secs(5 * 60);

pub async fn run(backend: Arc<dyn Backend>, cache: QueryCache, tx: mpsc::Sender<UiEvent>) {
    let mut ticker = interval(RECOMMENDATIONS_REFRESH);
    let mut failure_token: u64 = 0;
    info!("recommendations poller started");

    loop {
        ticker.tick().await;

        let token = cache.begin(&QueryKey::Recommendations);
        match fetch_with_retry(backend.as_ref()).await {
            Ok(payload) => {
                info!("recommendations refreshed");
                cache.settle(
                    &QueryKey::Recommendations,
                    token,
                    FetchState::Ready(QueryValue::Recommendations(payload)),
                    RECOMMENDATIONS_REFRESH,
                );
                if tx.send(UiEvent::Settled(QueryKey::Recommendations)).await.is_err() {
                    info!("event channel closed, recommendations poller shutting down");
                    return;
                }
            }
            Err(err) => {
                let message = err.to_string();
                warn!(error = %message, "recommendations fetch failed after retry");
                cache.settle(
                    &QueryKey::Recommendations,
                    token,
                    FetchState::Failed(message.clone()),
                    RECOMMENDATIONS_REFRESH,
                );
                failure_token += 1;
                let event = UiEvent::RecommendationsFailed { token: failure_token, message };
                if tx.send(event).await.is_err() {
                    info!("event channel closed, recommendations poller shutting down");
                    return;
                }
            }
        }
    }
}

/// One retry per cycle: a transient failure that recovers on the second
/// attempt settles as success.
pub async fn fetch_with_retry(backend: &dyn Backend) -> Result<RecommendationsResponse, ApiError> {
    match backend.recommendations().await {
        Ok(payload) => Ok(payload),
        Err(err) => {
            warn!(error = %err, "recommendations fetch failed, retrying");
            backend.recommendations().await
        }
    }
}
