use std::env;
use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    /// Backend origin serving the /api routes.
    pub api_base: String,
    /// Where tracing output lands; the terminal itself belongs to the UI.
    pub log_file: PathBuf,
    /// Prometheus exporter port. 0 disables the exporter.
    pub metrics_port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // dotenvy loads .env, but doesn't override already-set env vars
        dotenvy::dotenv().ok();

        let api_base = env::var("DASHBOARD_API_BASE")
            .unwrap_or_else(|_| "http://localhost:3001".to_string());

        let log_file = env::var("DASHBOARD_LOG_FILE")
            .unwrap_or_else(|_| "crypto-dashboard.log".to_string())
            .into();

        let metrics_port = match env::var("DASHBOARD_METRICS_PORT") {
            Ok(raw) => raw
                .parse()
                .context("DASHBOARD_METRICS_PORT must be a port number")?,
            Err(_) => 9100,
        };

        Ok(Self { api_base, log_file, metrics_port })
    }
}
