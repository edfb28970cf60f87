use std::path::PathBuf;

use clap::Parser;

use crate::config::{DEFAULT_OUTPUT_FILE, DEFAULT_RATE_LIMIT_SECS};
use crate::pipeline::DEFAULT_WORKER_COUNT;

#[derive(Parser)]
#[command(name = "financial-data-fetcher")]
#[command(about = "Fetches daily OHLCV time series for a list of symbols and saves them as JSON")]
#[command(version)]
pub struct Cli {
    /// Ticker symbols to fetch; falls back to the built-in watch list
    pub symbols: Vec<String>,

    /// File the aggregated batch is written to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Seconds each worker waits between consecutive API calls
    #[arg(long, default_value_t = DEFAULT_RATE_LIMIT_SECS)]
    pub rate_limit_secs: u64,

    /// Number of concurrent fetch workers
    #[arg(long, default_value_t = DEFAULT_WORKER_COUNT)]
    pub workers: usize,
}
