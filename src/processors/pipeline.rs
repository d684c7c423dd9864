use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::HttpFetch;
use crate::config::CrawlerConfig;
use crate::error::{CrawlError, Result, StationFailure};
use crate::models::StationCatalog;
use crate::processors::FetchWorkerPool;
use crate::utils::progress::ProgressReporter;
use crate::writers::CsvStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    LoadingIndex,
    Fetching,
    BackingUp,
    Appending,
    Reporting,
    Done,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub stations: usize,
    pub accepted: usize,
    pub existing: usize,
    pub duplicates: usize,
    pub failed: Vec<(String, StationFailure)>,
    pub backup: Option<PathBuf>,
}

impl RunSummary {
    pub fn has_new_records(&self) -> bool {
        self.accepted > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} new records, {} existing, {} duplicates, {}/{} stations failed",
            self.accepted,
            self.existing,
            self.duplicates,
            self.failed.len(),
            self.stations
        )
    }
}

/// One crawl: load index, fetch all stations, back up and append.
pub struct Pipeline<C: HttpFetch> {
    catalog: StationCatalog,
    store: CsvStore,
    pool: FetchWorkerPool<C>,
    token: String,
    state: PipelineState,
}

impl<C: HttpFetch> Pipeline<C> {
    pub fn new(
        catalog: StationCatalog,
        store: CsvStore,
        pool: FetchWorkerPool<C>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(CrawlError::Config("Access token is empty".to_string()));
        }

        Ok(Self {
            catalog,
            store,
            pool,
            token,
            state: PipelineState::Idle,
        })
    }

    pub fn from_config(
        config: &CrawlerConfig,
        catalog: StationCatalog,
        client: C,
        token: impl Into<String>,
    ) -> Result<Self> {
        config.validate()?;

        let pool = FetchWorkerPool::new(client)
            .with_max_workers(config.max_workers)
            .with_timeout(config.timeout())
            .with_base_url(config.api_base_url.clone());
        let store = CsvStore::new(&config.output_file, &config.backup_dir);

        Self::new(catalog, store, pool, token)
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    fn transition(&mut self, next: PipelineState) {
        debug!(from = ?self.state, to = ?next, "Pipeline state");
        self.state = next;
    }

    /// Run once. Station failures are absorbed into the summary; store
    /// failures abort the run before or during the write.
    pub async fn run(&mut self, progress: Option<&ProgressReporter>) -> Result<RunSummary> {
        self.transition(PipelineState::LoadingIndex);
        let index = Arc::new(self.store.load_index()?);
        info!(
            store = %self.store.path().display(),
            existing = index.existing_rows(),
            stations = self.catalog.len(),
            "Starting crawl"
        );

        self.transition(PipelineState::Fetching);
        let report = self
            .pool
            .fetch_all(&self.catalog, &self.token, Arc::clone(&index), progress)
            .await?;

        if !report.failures.is_empty() {
            warn!(locations = ?report.failed_locations(), "Stations without data this run");
        }

        let mut backup = None;
        if !report.accepted.is_empty() {
            self.transition(PipelineState::BackingUp);
            backup = self.store.backup()?;

            self.transition(PipelineState::Appending);
            self.store.append_all(&report.accepted)?;
        }

        self.transition(PipelineState::Reporting);
        let summary = RunSummary {
            stations: report.attempted,
            accepted: report.accepted.len(),
            existing: index.existing_rows(),
            duplicates: report.duplicates.len(),
            failed: report
                .failures
                .into_iter()
                .map(|(entry, failure)| (entry.location, failure))
                .collect(),
            backup,
        };
        info!("Summary: {}", summary);

        self.transition(PipelineState::Done);
        Ok(summary)
    }
}
