//! Error types for backend fetches.

use thiserror::Error;

/// Failures a fetch against the backend can settle with.
///
/// The three variants mirror the three ways a GET can go wrong:
/// the transport fails, the server answers with a non-success status,
/// or the body does not decode into the expected shape.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}
