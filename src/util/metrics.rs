use const_format::concatcp;
use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

/// Prefix shared by every metric the controller exports.
pub const METRICS_PREFIX: &str = "nsm_";

lazy_static! {
    pub static ref RECONCILE_COUNTER: CounterVec = register_counter_vec!(
        concatcp!(METRICS_PREFIX, "reconcile_counter"),
        "Number of reconciliations by the controller.",
        &["namespace"]
    )
    .unwrap();
    pub static ref ACTION_COUNTER: CounterVec = register_counter_vec!(
        concatcp!(METRICS_PREFIX, "action_counter"),
        "Number of actions taken by the controller.",
        &["namespace", "action"]
    )
    .unwrap();
    pub static ref READ_HISTOGRAM: HistogramVec = register_histogram_vec!(
        concatcp!(METRICS_PREFIX, "read_duration_seconds"),
        "Amount of time taken by the read phase of reconciliation.",
        &["namespace", "action"]
    )
    .unwrap();
    pub static ref WRITE_HISTOGRAM: HistogramVec = register_histogram_vec!(
        concatcp!(METRICS_PREFIX, "write_duration_seconds"),
        "Amount of time taken by the write phase of reconciliation.",
        &["namespace", "action"]
    )
    .unwrap();
    pub static ref WATCH_EVENT_COUNTER: CounterVec = register_counter_vec!(
        concatcp!(METRICS_PREFIX, "watch_event_counter"),
        "Number of namespace events delivered by the reflector.",
        &["kind"]
    )
    .unwrap();
    pub static ref WATCH_RESTART_COUNTER: CounterVec = register_counter_vec!(
        concatcp!(METRICS_PREFIX, "watch_restart_counter"),
        "Number of times the namespace watch was re-established.",
        &["reason"]
    )
    .unwrap();
}
