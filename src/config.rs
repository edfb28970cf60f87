use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::error::{AppError, Result};
use crate::fetch::client::DEFAULT_ENDPOINT;

/// Watch list used when no symbols are given on the command line.
pub const DEFAULT_SYMBOLS: &[&str] = &["IBM", "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "NVDA"];

/// ~5 requests/minute free-tier quota, so ~13 seconds between calls.
pub const DEFAULT_RATE_LIMIT_SECS: u64 = 13;

pub const DEFAULT_OUTPUT_FILE: &str = "stock_data.json";

const API_KEY_VAR: &str = "API_KEY";
const ENDPOINT_VAR: &str = "ALPHAVANTAGE_URL";

/// Fully resolved runtime settings: CLI flags merged with the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub endpoint: String,
    pub symbols: Vec<String>,
    pub rate_limit: Duration,
    pub worker_count: usize,
    pub output_path: PathBuf,
}

impl Settings {
    /// Resolve settings from the parsed CLI plus the process environment.
    /// The API credential is only ever supplied out-of-band.
    pub fn resolve(cli: Cli) -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR).map_err(|_| {
            AppError::message(format!(
                "{} must be set in the environment or a .env file",
                API_KEY_VAR
            ))
        })?;
        let endpoint =
            std::env::var(ENDPOINT_VAR).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        Ok(Self::merge(cli, api_key, endpoint))
    }

    fn merge(cli: Cli, api_key: String, endpoint: String) -> Self {
        let symbols = if cli.symbols.is_empty() {
            DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
        } else {
            cli.symbols
        };

        Self {
            api_key,
            endpoint,
            symbols,
            rate_limit: Duration::from_secs(cli.rate_limit_secs),
            worker_count: cli.workers,
            output_path: cli.output,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults_apply_when_no_flags_given() {
        let cli = Cli::parse_from(["financial-data-fetcher"]);
        let settings = Settings::merge(cli, "key".into(), DEFAULT_ENDPOINT.into());

        assert_eq!(settings.symbols.len(), DEFAULT_SYMBOLS.len());
        assert_eq!(settings.symbols[0], "IBM");
        assert_eq!(settings.rate_limit, Duration::from_secs(DEFAULT_RATE_LIMIT_SECS));
        assert_eq!(settings.worker_count, crate::pipeline::DEFAULT_WORKER_COUNT);
        assert_eq!(settings.output_path, PathBuf::from(DEFAULT_OUTPUT_FILE));
    }

    #[test]
    fn explicit_symbols_replace_the_watch_list() {
        let cli = Cli::parse_from([
            "financial-data-fetcher",
            "TSLA",
            "NVDA",
            "--rate-limit-secs",
            "0",
            "--workers",
            "2",
        ]);
        let settings = Settings::merge(cli, "key".into(), DEFAULT_ENDPOINT.into());

        assert_eq!(settings.symbols, vec!["TSLA", "NVDA"]);
        assert_eq!(settings.rate_limit, Duration::ZERO);
        assert_eq!(settings.worker_count, 2);
    }
}
