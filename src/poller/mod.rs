pub mod history;
pub mod portfolio;
pub mod prices;
pub mod recommendations;

use crate::state::fetch::QueryKey;

/// Notifications the pollers push to the UI loop.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A query settled; the UI redraws from the cache.
    Settled(QueryKey),
    /// A recommendations cycle failed even after its retry. The token
    /// increases monotonically per distinct failure so the toast can fire
    /// exactly once no matter how many redraws follow.
    RecommendationsFailed { token: u64, message: String },
}
