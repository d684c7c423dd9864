pub mod fetch_pool;
pub mod pipeline;

pub use fetch_pool::{FetchReport, FetchWorkerPool, StationOutcome, StationResult};
pub use pipeline::{Pipeline, PipelineState, RunSummary};
