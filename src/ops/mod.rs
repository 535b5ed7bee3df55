// * Operations: structured logging and Prometheus counters

pub mod telemetry;

// * Re-exports for convenient access
pub use telemetry::{
    get_metrics_string, init_tracing, init_tracing_pretty, init_tracing_with_level,
    record_escalation, record_fetch_duration, record_fetch_retry, record_field_degraded,
    record_item_outcome, record_stored, set_queue_depth,
};
