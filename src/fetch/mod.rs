use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::records::StockRecord;

pub mod client;
pub mod decode;

pub use client::AlphaVantageClient;

/// Query function requested from the remote endpoint.
pub const DAILY_SERIES_FUNCTION: &str = "TIME_SERIES_DAILY";

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Failure causes for a single symbol's fetch. Every variant names the
/// originating symbol so a batch-level abort stays traceable.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for {symbol} failed: {source}")]
    Transport {
        symbol: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request for {symbol} returned status {status}")]
    Status { symbol: String, status: StatusCode },
    #[error("API error for {symbol}: {message}")]
    Api { symbol: String, message: String },
    #[error("malformed response for {symbol}: {detail}")]
    Malformed { symbol: String, detail: String },
}

impl FetchError {
    pub fn symbol(&self) -> &str {
        match self {
            FetchError::Transport { symbol, .. }
            | FetchError::Status { symbol, .. }
            | FetchError::Api { symbol, .. }
            | FetchError::Malformed { symbol, .. } => symbol,
        }
    }
}

/// Seam between the pipeline and the concrete HTTP client, so the worker
/// pool can be exercised against a scripted source in tests.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_daily(&self, symbol: &str) -> FetchResult<StockRecord>;
}
