use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Context, Result};
use crate::records::StockRecord;

use super::{decode, FetchError, FetchResult, QuoteSource, DAILY_SERIES_FUNCTION};

pub const DEFAULT_ENDPOINT: &str = "https://www.alphavantage.co/query";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the Alpha Vantage query endpoint. One GET per symbol,
/// no retries; a fetch either yields a `StockRecord` or a `FetchError`.
pub struct AlphaVantageClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to construct HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl QuoteSource for AlphaVantageClient {
    async fn fetch_daily(&self, symbol: &str) -> FetchResult<StockRecord> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("function", DAILY_SERIES_FUNCTION),
                ("symbol", symbol),
                ("apikey", &self.api_key),
            ])
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                symbol: symbol.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                symbol: symbol.to_string(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                symbol: symbol.to_string(),
                source,
            })?;

        decode::parse_daily_payload(symbol, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::Server) -> AlphaVantageClient {
        AlphaVantageClient::with_endpoint("demo-key", server.url()).expect("build client")
    }

    #[tokio::test]
    async fn fetches_and_decodes_daily_series() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("function".into(), "TIME_SERIES_DAILY".into()),
                mockito::Matcher::UrlEncoded("symbol".into(), "IBM".into()),
                mockito::Matcher::UrlEncoded("apikey".into(), "demo-key".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{
                    "Meta Data": {"3. Last Refreshed": "2024-01-01"},
                    "Time Series (Daily)": {
                        "2024-01-01": {
                            "1. open": "100.0",
                            "2. high": "105.0",
                            "3. low": "99.0",
                            "4. close": "102.0",
                            "5. volume": "1000"
                        }
                    }
                }"#,
            )
            .create_async()
            .await;

        let record = client_for(&server).fetch_daily("IBM").await.unwrap();

        mock.assert_async().await;
        assert_eq!(record.symbol, "IBM");
        assert_eq!(record.last_refreshed, "2024-01-01");
        assert_eq!(record.time_series["2024-01-01"].volume, 1000);
    }

    #[tokio::test]
    async fn non_ok_status_is_a_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let err = client_for(&server).fetch_daily("IBM").await.unwrap_err();

        match err {
            FetchError::Status { symbol, status } => {
                assert_eq!(symbol, "IBM");
                assert_eq!(status.as_u16(), 500);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn api_error_body_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"Error Message": "Invalid API call."}"#)
            .create_async()
            .await;

        let err = client_for(&server).fetch_daily("BOGUS").await.unwrap_err();

        assert!(matches!(err, FetchError::Api { .. }));
        assert_eq!(err.symbol(), "BOGUS");
    }
}
