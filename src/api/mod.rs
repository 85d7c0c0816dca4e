pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::ApiError;
use types::{Candle, Holding, RecommendationsResponse, SpotPrice};

/// The fetch seam between the pollers and the backend.
///
/// `client::ApiClient` is the real implementation; tests substitute fakes
/// to control completion order and failure patterns.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn portfolio(&self) -> Result<Vec<Holding>, ApiError>;
    async fn spot_price(&self, symbol: &str) -> Result<SpotPrice, ApiError>;
    async fn price_history(&self, symbol: &str) -> Result<Vec<Candle>, ApiError>;
    async fn recommendations(&self) -> Result<RecommendationsResponse, ApiError>;
}
