use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::client::{feed_url, HttpFetch};
use crate::error::{Result, StationFailure, TransportError};
use crate::models::{Observation, RecordKey, StationCatalog, StationEntry};
use crate::readers::{DedupIndex, ResponseParser};
use crate::utils::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_MAX_WORKERS, DEFAULT_TIMEOUT_SECS, MAX_WORKERS_LIMIT,
};
use crate::utils::progress::ProgressReporter;

/// What one station contributed to a run.
#[derive(Debug, Clone, PartialEq)]
pub enum StationOutcome {
    Accepted(Observation),
    Duplicate(RecordKey),
    Failed(StationFailure),
}

#[derive(Debug, Clone)]
pub struct StationResult {
    pub entry: StationEntry,
    pub outcome: StationOutcome,
}

/// Merged outcomes of every station in a run.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub attempted: usize,
    pub accepted: Vec<Observation>,
    pub duplicates: Vec<RecordKey>,
    pub failures: Vec<(StationEntry, StationFailure)>,
}

impl FetchReport {
    fn record(&mut self, result: StationResult) {
        self.attempted += 1;
        match result.outcome {
            StationOutcome::Accepted(observation) => self.accepted.push(observation),
            StationOutcome::Duplicate(key) => self.duplicates.push(key),
            StationOutcome::Failed(failure) => self.failures.push((result.entry, failure)),
        }
    }

    pub fn failed_locations(&self) -> Vec<&str> {
        self.failures
            .iter()
            .map(|(entry, _)| entry.location.as_str())
            .collect()
    }
}

/// Fetches, parses and dedupe-checks every station of a catalog with a
/// bounded number of requests in flight.
pub struct FetchWorkerPool<C: HttpFetch> {
    client: Arc<C>,
    parser: ResponseParser,
    max_workers: usize,
    timeout: Duration,
    base_url: String,
}

impl<C: HttpFetch> FetchWorkerPool<C> {
    pub fn new(client: C) -> Self {
        Self {
            client: Arc::new(client),
            parser: ResponseParser::new(),
            max_workers: DEFAULT_MAX_WORKERS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Clamped to `1..=MAX_WORKERS_LIMIT`.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.clamp(1, MAX_WORKERS_LIMIT);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Process every station exactly once.
    ///
    /// Station failures are folded into the report. Only an unusable base
    /// URL or a panicked worker task surfaces as an error.
    pub async fn fetch_all(
        &self,
        catalog: &StationCatalog,
        token: &str,
        index: Arc<DedupIndex>,
        progress: Option<&ProgressReporter>,
    ) -> Result<FetchReport> {
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        for entry in catalog {
            let entry = entry.clone();
            let url = feed_url(&self.base_url, &entry.station_id, token)?;
            let client = Arc::clone(&self.client);
            let semaphore = Arc::clone(&semaphore);
            let index = Arc::clone(&index);
            let parser = self.parser.clone();
            let timeout = self.timeout;

            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition cannot fail.
                let _permit = semaphore.acquire_owned().await.ok();
                debug!(
                    location = %entry.location,
                    station_id = %entry.station_id,
                    "Fetching station"
                );

                let outcome =
                    process_station(client.as_ref(), &parser, &url, timeout, &entry, &index).await;
                log_outcome(&entry, &outcome);

                StationResult { entry, outcome }
            });
        }

        let mut report = FetchReport::default();
        while let Some(joined) = tasks.join_next().await {
            report.record(joined?);
            if let Some(p) = progress {
                p.increment(1);
            }
        }

        report.accepted.sort_by(|a, b| a.location.cmp(&b.location));
        Ok(report)
    }
}

async fn process_station<C: HttpFetch>(
    client: &C,
    parser: &ResponseParser,
    url: &str,
    timeout: Duration,
    entry: &StationEntry,
    index: &DedupIndex,
) -> StationOutcome {
    let body = match tokio::time::timeout(timeout, client.get(url)).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => return StationOutcome::Failed(e.into()),
        Err(_) => return StationOutcome::Failed(TransportError::Timeout.into()),
    };

    match parser.parse_response(&body, &entry.location) {
        Ok(observation) => {
            let key = observation.key();
            if index.contains_key(&key) {
                StationOutcome::Duplicate(key)
            } else {
                StationOutcome::Accepted(observation)
            }
        }
        Err(failure) => StationOutcome::Failed(failure),
    }
}

fn log_outcome(entry: &StationEntry, outcome: &StationOutcome) {
    match outcome {
        StationOutcome::Accepted(observation) => info!(
            location = %entry.location,
            timestamp = %observation.timestamp,
            "Crawled station"
        ),
        StationOutcome::Duplicate(key) => info!(
            location = %entry.location,
            timestamp = %key.timestamp,
            "Skipped duplicate"
        ),
        StationOutcome::Failed(failure) => warn!(
            location = %entry.location,
            station_id = %entry.station_id,
            error = %failure,
            "Station failed"
        ),
    }
}
