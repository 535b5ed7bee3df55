pub mod constants;
pub mod settings;

pub use settings::{BatchSettings, FetchSettings, HarvestSettings, RetrySettings};
