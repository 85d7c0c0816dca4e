use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus HTTP exporter on the configured port.
/// After this call, any metrics recorded via the `metrics` crate
/// macros (counter!, histogram!) are automatically exported at /metrics.
/// Port 0 disables the exporter.
pub fn init_exporter(port: u16) {
    if port == 0 {
        return;
    }
    PrometheusBuilder::new()
        .with_http_listener(([127, 0, 0, 1], port))
        .install()
        .expect("failed to start Prometheus metrics exporter");
}

// ── Fetch metrics ────────────────────────────────────────────────

pub fn record_fetch(endpoint: &str, outcome: &str) {
    counter!("backend_fetch_total", "endpoint" => endpoint.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

pub fn record_fetch_latency(endpoint: &str, latency_ms: f64) {
    histogram!("backend_fetch_latency_ms", "endpoint" => endpoint.to_string())
        .record(latency_ms);
}
