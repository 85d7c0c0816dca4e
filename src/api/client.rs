//! HTTP client for the dashboard backend.
//!
//! One method per endpoint. Returns wire types; any non-2xx status is a
//! failure, and bodies that do not decode settle as `ApiError::Decode`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::types::{Candle, Holding, RecommendationsResponse, SpotPrice};
use crate::api::Backend;
use crate::error::ApiError;
use crate::metrics::prometheus::{record_fetch, record_fetch_latency};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Quote currency is fixed; every price and history request is a `-GBP` pair.
const QUOTE_CURRENCY: &str = "GBP";

pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self { base_url: base_url.trim_end_matches('/').to_string(), client }
    }

    /// GET `{base_url}{path}` and decode the JSON body.
    /// Records a per-endpoint outcome counter and latency histogram.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        endpoint: &'static str,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let started = Instant::now();

        let result = self.fetch(&url).await;

        record_fetch_latency(endpoint, started.elapsed().as_secs_f64() * 1000.0);
        record_fetch(endpoint, if result.is_ok() { "ok" } else { "error" });

        result
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!(%url, "fetching");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| String::new());
            return Err(ApiError::Status { status: status.as_u16(), body });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn portfolio(&self) -> Result<Vec<Holding>, ApiError> {
        self.get_json("/api/crypto/portfolio", "portfolio").await
    }

    async fn spot_price(&self, symbol: &str) -> Result<SpotPrice, ApiError> {
        let path = format!("/api/crypto/price/{symbol}-{QUOTE_CURRENCY}");
        self.get_json(&path, "price").await
    }

    async fn price_history(&self, symbol: &str) -> Result<Vec<Candle>, ApiError> {
        let path = format!("/api/crypto/historical/{symbol}-{QUOTE_CURRENCY}");
        self.get_json(&path, "historical").await
    }

    async fn recommendations(&self) -> Result<RecommendationsResponse, ApiError> {
        self.get_json("/api/recommendations", "recommendations").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:3001/");
        assert_eq!(client.base_url, "http://localhost:3001");
    }

    #[test]
    fn holding_decodes_from_backend_json() {
        let body = r#"[{"currency":"BTC","balance":"0.5","available":"0.4"}]"#;
        let holdings: Vec<Holding> = serde_json::from_str(body).unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].currency, "BTC");
        assert_eq!(holdings[0].balance, "0.5");
    }

    #[test]
    fn spot_price_decodes_without_24h_fields() {
        // The minimal backend variant sends only price and time.
        let body = r#"{"price":"40123.40","time":"2025-01-02T03:04:05"}"#;
        let price: SpotPrice = serde_json::from_str(body).unwrap();
        assert_eq!(price.price, "40123.40");
        assert!(price.change_24h.is_none());
    }

    #[test]
    fn error_body_does_not_decode_as_price() {
        // The backend reports unsupported pairs as {"error": ...} with a 200;
        // the missing `price` field turns that into a Decode failure.
        let body = r#"{"error":"Trading pair XYZ-GBP is not supported."}"#;
        assert!(serde_json::from_str::<SpotPrice>(body).is_err());
    }
}
