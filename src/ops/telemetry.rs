// * Telemetry - JSON Logging and Prometheus Metrics
// * Structured logs for every run and process-wide counters for harvest progress

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, CounterVec, Encoder, Gauge,
    HistogramVec, TextEncoder,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

lazy_static! {
    // * Work items by final outcome (persisted, skipped, duplicate, rejected, not_found, failed)
    pub static ref ITEMS_TOTAL: CounterVec = register_counter_vec!(
        "reel_items_total",
        "Work items processed by outcome",
        &["outcome"]
    ).expect("Failed to register reel_items_total");

    // * Inserted records by table
    pub static ref RECORDS_STORED_TOTAL: CounterVec = register_counter_vec!(
        "reel_records_stored_total",
        "Records inserted by kind",
        &["kind"]
    ).expect("Failed to register reel_records_stored_total");

    // * Re-fetches triggered by malformed payloads or transient transport errors
    pub static ref FETCH_RETRIES_TOTAL: CounterVec = register_counter_vec!(
        "reel_fetch_retries_total",
        "Fetch retries by cause",
        &["cause"]
    ).expect("Failed to register reel_fetch_retries_total");

    // * Escalations to a later transport tier
    pub static ref FETCH_ESCALATIONS_TOTAL: CounterVec = register_counter_vec!(
        "reel_fetch_escalations_total",
        "Transport tier escalations by target tier",
        &["tier"]
    ).expect("Failed to register reel_fetch_escalations_total");

    // * Fields that fell through every strategy to the sentinel
    pub static ref FIELD_DEGRADED_TOTAL: CounterVec = register_counter_vec!(
        "reel_field_degraded_total",
        "Fields resolved to the unknown sentinel",
        &["field"]
    ).expect("Failed to register reel_field_degraded_total");

    // * Fetch latency per transport tier
    pub static ref FETCH_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "reel_fetch_duration_seconds",
        "Page fetch duration in seconds",
        &["tier"],
        vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).expect("Failed to register reel_fetch_duration_seconds");

    // * Ids still pending in the current run
    pub static ref QUEUE_DEPTH: Gauge = register_gauge!(
        "reel_queue_depth",
        "Pending ids in the work queue"
    ).expect("Failed to register reel_queue_depth");
}

/// Initializes the tracing subscriber with JSON formatting
///
/// # Example
/// ```ignore
/// use reel_harvest::ops::telemetry;
///
/// telemetry::init_tracing();
/// tracing::info!(id = "tt0111161", "Processing title");
/// ```
pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Initializes tracing with custom log level (RUST_LOG still wins when set)
pub fn init_tracing_with_level(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // * try_init: a second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json())
        .try_init();
}

/// Initializes tracing with pretty formatting (for development)
pub fn init_tracing_pretty() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().pretty())
        .try_init();
}

/// Returns the current metrics in the Prometheus text format
pub fn get_metrics_string() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}

pub fn record_item_outcome(outcome: &str) {
    ITEMS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_stored(kind: &str) {
    RECORDS_STORED_TOTAL.with_label_values(&[kind]).inc();
}

pub fn record_fetch_retry(cause: &str) {
    FETCH_RETRIES_TOTAL.with_label_values(&[cause]).inc();
}

pub fn record_escalation(tier: &str) {
    FETCH_ESCALATIONS_TOTAL.with_label_values(&[tier]).inc();
}

pub fn record_field_degraded(field: &str) {
    FIELD_DEGRADED_TOTAL.with_label_values(&[field]).inc();
}

pub fn record_fetch_duration(tier: &str, seconds: f64) {
    FETCH_DURATION_SECONDS
        .with_label_values(&[tier])
        .observe(seconds);
}

pub fn set_queue_depth(depth: usize) {
    QUEUE_DEPTH.set(depth as f64);
}
