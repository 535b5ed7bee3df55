// * The Engine
// * Normalization, retry pacing, the single-item pipeline and the batch driver.

pub mod backoff;
pub mod batch;
pub mod normalization;
pub mod pipeline;
pub mod rate_limiter;

// * Re-exports for convenient access
pub use backoff::Backoff;
pub use batch::{BatchDriver, BatchError, BatchReport};
pub use pipeline::{scrape_one, Disposition, ItemOutcome, Pipeline, PipelineError};
pub use rate_limiter::{PauseThrottle, RequestPacer};
