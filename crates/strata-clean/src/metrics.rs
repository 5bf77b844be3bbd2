//! Clean-planning metrics.
//!
//! Provides metrics for trigger evaluation, crash repair, and plan
//! generation. These complement the structured logging already emitted by
//! the orchestrator.

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Plans generated counter.
pub const PLANS_GENERATED: &str = "strata_clean_plans_total";

/// Crashed clean requests repaired counter.
pub const REQUESTS_REPAIRED: &str = "strata_clean_requests_repaired_total";

/// Partitions scanned counter.
pub const PARTITIONS_SCANNED: &str = "strata_clean_partitions_scanned_total";

/// Files planned for deletion counter.
pub const FILES_PLANNED: &str = "strata_clean_files_planned_total";

/// Plan computation duration histogram.
pub const PLAN_DURATION: &str = "strata_clean_plan_duration_seconds";

/// Registers all clean metric descriptions.
///
/// Call this once at application startup after initializing the metrics
/// recorder.
pub fn register_metrics() {
    describe_counter!(PLANS_GENERATED, "Total cleaner plans generated");
    describe_counter!(
        REQUESTS_REPAIRED,
        "Total crashed clean requests repaired during recovery"
    );
    describe_counter!(PARTITIONS_SCANNED, "Total partitions scanned for cleaning");
    describe_counter!(FILES_PLANNED, "Total file versions planned for deletion");
    describe_histogram!(PLAN_DURATION, "Duration of plan computation in seconds");
}

/// Records a completed plan computation.
pub fn record_plan_generated(partitions_scanned: u64, files_planned: u64, duration_secs: f64) {
    counter!(PLANS_GENERATED).increment(1);
    counter!(PARTITIONS_SCANNED).increment(partitions_scanned);
    counter!(FILES_PLANNED).increment(files_planned);
    histogram!(PLAN_DURATION).record(duration_secs);
}

/// Records the repair of one crashed clean request.
pub fn record_request_repaired() {
    counter!(REQUESTS_REPAIRED).increment(1);
}
