use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::fetch::{FetchError, QuoteSource};
use crate::records::StockRecord;
use crate::storage::RecordSink;

/// Default concurrency applied to a batch run.
pub const DEFAULT_WORKER_COUNT: usize = 3;

/// Fetches a batch of symbols through a fixed pool of workers and hands the
/// aggregate to the sink. Symbols are claimed off a shared cursor, so each
/// one is fetched exactly once regardless of pool size; the pool bounds
/// concurrency, not redundancy.
///
/// Failure policy is all-or-nothing: the run waits for every worker, then
/// returns the first drained error and discards any accumulated successes.
/// The sink only ever sees a fully error-free batch.
pub struct FetchPipeline {
    source: Arc<dyn QuoteSource>,
    sink: Arc<dyn RecordSink>,
    rate_limit: Duration,
    worker_count: usize,
    pub progress_counter: Arc<AtomicUsize>,
}

impl FetchPipeline {
    pub fn new(
        source: Arc<dyn QuoteSource>,
        sink: Arc<dyn RecordSink>,
        rate_limit: Duration,
    ) -> Self {
        Self::with_worker_count(source, sink, rate_limit, DEFAULT_WORKER_COUNT)
    }

    pub fn with_worker_count(
        source: Arc<dyn QuoteSource>,
        sink: Arc<dyn RecordSink>,
        rate_limit: Duration,
        worker_count: usize,
    ) -> Self {
        Self {
            source,
            sink,
            rate_limit,
            worker_count: worker_count.max(1),
            progress_counter: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn run(
        &self,
        symbols: Vec<String>,
        cancel: CancellationToken,
    ) -> Result<Vec<StockRecord>> {
        let symbols: Arc<[String]> = symbols.into();
        // One outcome per symbol under the exactly-once cursor, so sends
        // never block at this capacity.
        let capacity = symbols.len().max(1);
        let (results_tx, mut results_rx) = mpsc::channel::<StockRecord>(capacity);
        let (errors_tx, mut errors_rx) = mpsc::channel::<FetchError>(capacity);
        let cursor = Arc::new(AtomicUsize::new(0));

        self.progress_counter.store(0, Ordering::SeqCst);

        let mut workers = Vec::with_capacity(self.worker_count);
        for _ in 0..self.worker_count {
            workers.push(tokio::spawn(worker_loop(
                Arc::clone(&self.source),
                Arc::clone(&symbols),
                Arc::clone(&cursor),
                Arc::clone(&self.progress_counter),
                self.rate_limit,
                cancel.clone(),
                results_tx.clone(),
                errors_tx.clone(),
            )));
        }
        drop(results_tx);
        drop(errors_tx);

        for joined in futures::future::join_all(workers).await {
            joined?;
        }

        let mut batch = Vec::with_capacity(symbols.len());
        while let Some(record) = results_rx.recv().await {
            batch.push(record);
        }

        if let Some(err) = errors_rx.recv().await {
            return Err(err.into());
        }

        self.sink.save(&batch)?;
        Ok(batch)
    }
}

#[allow(clippy::too_many_arguments)]
async fn worker_loop(
    source: Arc<dyn QuoteSource>,
    symbols: Arc<[String]>,
    cursor: Arc<AtomicUsize>,
    progress: Arc<AtomicUsize>,
    rate_limit: Duration,
    cancel: CancellationToken,
    results: mpsc::Sender<StockRecord>,
    errors: mpsc::Sender<FetchError>,
) {
    loop {
        // Cooperative cancellation, checked per symbol; an in-flight fetch
        // is never interrupted.
        if cancel.is_cancelled() {
            return;
        }

        let index = cursor.fetch_add(1, Ordering::SeqCst);
        let Some(symbol) = symbols.get(index) else {
            return;
        };

        match source.fetch_daily(symbol).await {
            Ok(record) => {
                let _ = results.send(record).await;
            }
            Err(err) => {
                log::warn!("{}", err);
                let _ = errors.send(err).await;
            }
        }
        progress.fetch_add(1, Ordering::SeqCst);

        // Throttle between fetches only; no tail sleep once the queue is
        // exhausted.
        if !rate_limit.is_zero() && cursor.load(Ordering::SeqCst) < symbols.len() {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = sleep(rate_limit) => {}
            }
        }
    }
}
