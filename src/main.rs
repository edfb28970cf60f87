use std::process;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use financial_data_fetcher::cli::Cli;
use financial_data_fetcher::config::Settings;
use financial_data_fetcher::fetch::AlphaVantageClient;
use financial_data_fetcher::pipeline::FetchPipeline;
use financial_data_fetcher::storage::JsonFileSink;
use financial_data_fetcher::Result;

#[tokio::main]
async fn main() {
    env_logger::init();

    if dotenvy::dotenv().is_err() {
        log::warn!("No .env file found");
    }

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        log::error!("Error processing symbols: {err}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let start = Instant::now();
    let Settings {
        api_key,
        endpoint,
        symbols,
        rate_limit,
        worker_count,
        output_path,
    } = Settings::resolve(cli)?;

    let client = AlphaVantageClient::with_endpoint(api_key, endpoint)?;
    let sink = JsonFileSink::new(&output_path);
    let pipeline = FetchPipeline::with_worker_count(
        Arc::new(client),
        Arc::new(sink),
        rate_limit,
        worker_count,
    );

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupt received, letting in-flight fetches finish");
            interrupt.cancel();
        }
    });

    log::info!(
        "Fetching {} symbols with {} workers",
        symbols.len(),
        worker_count
    );

    let batch = pipeline.run(symbols, cancel).await?;

    log::info!(
        "Successfully processed {} stocks in {:.2?}, output written to {}",
        batch.len(),
        start.elapsed(),
        output_path.display()
    );
    Ok(())
}
