//! Orchestration metrics.

use metrics::counter;
use shorts_models::Stage;

pub mod names {
    pub const ASSET_OUTCOMES_TOTAL: &str = "shorts_asset_outcomes_total";
    pub const STALE_RESULTS_TOTAL: &str = "shorts_stale_results_discarded_total";
    pub const STAGE_FAILURES_TOTAL: &str = "shorts_stage_failures_total";
    pub const VIDEOS_ASSEMBLED_TOTAL: &str = "shorts_videos_assembled_total";
}

/// Record a settled image slot (`ready`, `request` or `retrieval`).
pub fn record_asset_outcome(outcome: &'static str) {
    counter!(names::ASSET_OUTCOMES_TOTAL, "outcome" => outcome).increment(1);
}

/// Record a service answer that arrived after its request was superseded.
pub fn record_stale_result(stage: Stage) {
    counter!(names::STALE_RESULTS_TOTAL, "stage" => stage.as_str()).increment(1);
}

pub fn record_stage_failure(stage: Stage) {
    counter!(names::STAGE_FAILURES_TOTAL, "stage" => stage.as_str()).increment(1);
}

pub fn record_video_assembled() {
    counter!(names::VIDEOS_ASSEMBLED_TOTAL).increment(1);
}
