//! Fan-out of series requests to their adapters.
//!
//! Each request runs as its own task behind a shared rate limiter and a
//! concurrency cap. Every failure becomes a recorded [`FetchResult::Failed`]
//! entry, so one series can never abort its siblings. Results are written back
//! into their request slot, which keeps the dataset in request order whatever
//! the completion order was.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::data_source::SeriesSource;
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;
use crate::{
    AggregateDataset, AggregateError, DatasetEntry, DateRange, FailureReason, FetchFailure,
    FetchResult, PipelineConfig, SeriesMetadata, SourceKind,
};

/// One series to fetch over one window.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRequest {
    pub metadata: SeriesMetadata,
    pub range: DateRange,
}

impl SeriesRequest {
    pub fn new(metadata: SeriesMetadata, range: DateRange) -> Self {
        Self { metadata, range }
    }
}

/// Drives requests through adapters and assembles the run's dataset.
#[derive(Clone)]
pub struct Aggregator {
    adapters: HashMap<SourceKind, Arc<dyn SeriesSource>>,
    limiter: RateLimiter,
    retry: RetryPolicy,
    concurrency: usize,
    deadline: Option<Duration>,
}

impl Aggregator {
    /// Adapters are keyed by their source kind; a later adapter of the same
    /// kind replaces an earlier one.
    pub fn new(adapters: Vec<Arc<dyn SeriesSource>>, limiter: RateLimiter) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.kind(), adapter))
            .collect();
        Self {
            adapters,
            limiter,
            retry: RetryPolicy::default(),
            concurrency: 4,
            deadline: None,
        }
    }

    pub fn from_config(config: &PipelineConfig, adapters: Vec<Arc<dyn SeriesSource>>) -> Self {
        Self::new(adapters, config.rate_limiter())
            .with_retry_policy(config.retry_policy())
            .with_concurrency(config.fetch_concurrency)
            .with_deadline(config.run_deadline)
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Fetches every request. Fails only when the request list itself is
    /// unusable (empty or containing a duplicate identifier).
    pub async fn collect(&self, requests: Vec<SeriesRequest>) -> Result<AggregateDataset, AggregateError> {
        validate_requests(&requests)?;

        let started = Instant::now();
        let deadline = self
            .deadline
            .and_then(|limit| tokio::time::Instant::now().checked_add(limit));
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut slots: Vec<Option<FetchResult>> = vec![None; requests.len()];
        let mut tasks = JoinSet::new();

        for (index, request) in requests.iter().enumerate() {
            let kind = request.metadata.kind;
            let Some(adapter) = self.adapters.get(&kind).cloned() else {
                slots[index] = Some(FetchResult::failed(FetchFailure::new(
                    FailureReason::NotFound,
                    kind,
                    format!("no adapter registered for source kind '{kind}'"),
                )));
                continue;
            };

            let task = FetchTask {
                adapter,
                limiter: self.limiter.clone(),
                retry: self.retry,
                request: request.clone(),
            };
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let limit = task.deadline_failure_message();
                let run = async {
                    let _slot = semaphore.acquire_owned().await.ok();
                    task.run().await
                };
                let result = match deadline {
                    Some(at) => tokio::time::timeout_at(at, run).await.unwrap_or_else(|_| {
                        FetchResult::failed(FetchFailure::new(FailureReason::Timeout, kind, limit))
                    }),
                    None => run.await,
                };
                (index, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(error) => warn!(error = %error, "fetch task ended abnormally"),
            }
        }

        let entries: Vec<DatasetEntry> = requests
            .into_iter()
            .zip(slots)
            .map(|(request, slot)| {
                let result = slot.unwrap_or_else(|| {
                    FetchResult::failed(FetchFailure::new(
                        FailureReason::TransientError,
                        request.metadata.kind,
                        "fetch task ended before producing a result",
                    ))
                });
                DatasetEntry {
                    metadata: request.metadata,
                    result,
                }
            })
            .collect();

        let dataset = AggregateDataset::from_entries(entries);
        info!(
            requested = dataset.len(),
            available = dataset.available().count(),
            failed = dataset.failed().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "aggregation finished"
        );
        Ok(dataset)
    }
}

fn validate_requests(requests: &[SeriesRequest]) -> Result<(), AggregateError> {
    if requests.is_empty() {
        return Err(AggregateError::EmptyRequest);
    }

    let mut seen = HashSet::with_capacity(requests.len());
    for request in requests {
        if !seen.insert(&request.metadata.id) {
            return Err(AggregateError::DuplicateIdentifier {
                identifier: request.metadata.id.to_string(),
            });
        }
    }
    Ok(())
}

struct FetchTask {
    adapter: Arc<dyn SeriesSource>,
    limiter: RateLimiter,
    retry: RetryPolicy,
    request: SeriesRequest,
}

impl FetchTask {
    fn deadline_failure_message(&self) -> String {
        format!("run deadline expired before '{}' completed", self.request.metadata.id)
    }

    async fn run(&self) -> FetchResult {
        let metadata = &self.request.metadata;
        let kind = metadata.kind;
        let mut attempt = 0;

        loop {
            let outcome = match self.limiter.acquire(kind).await {
                Ok(_permit) => self.adapter.fetch(metadata, self.request.range).await,
                Err(error) => Err(error),
            };

            match outcome {
                Ok(series) => {
                    debug!(series = %metadata.id, points = series.len(), attempt, "series available");
                    return FetchResult::available(series);
                }
                Err(error) if self.retry.should_retry(&error, attempt) => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    debug!(
                        series = %metadata.id,
                        code = error.code(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "retrying fetch"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    warn!(
                        series = %metadata.id,
                        source = %kind,
                        code = error.code(),
                        message = error.message(),
                        "series unavailable"
                    );
                    return FetchResult::failed(
                        FetchFailure::new(error.reason(), kind, error.message())
                            .with_attempts(attempt + 1),
                    );
                }
            }
        }
    }
}
