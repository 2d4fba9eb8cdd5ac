//! Structured session logging.
//!
//! Every log line carries the session token and the pipeline stage so a
//! single run can be followed in aggregated logs.

use shorts_models::{SessionId, Stage};
use tracing::{error, info, warn, Span};

/// Logger bound to one session and one stage.
///
/// Each line is emitted with `session_id` and `stage` fields so a studio
/// run can be filtered out of interleaved output.
#[derive(Debug, Clone)]
pub struct SessionLogger {
    session_id: String,
    stage: &'static str,
}

impl SessionLogger {
    /// Create a logger for one stage of a session.
    ///
    /// # Arguments
    /// * `session_id` - The session token shared by every artifact of the run
    /// * `stage` - The pipeline stage being logged (e.g. `Stage::Assets`)
    pub fn new(session_id: &SessionId, stage: Stage) -> Self {
        Self {
            session_id: session_id.to_string(),
            stage: stage.as_str(),
        }
    }

    /// Same session, different stage.
    pub fn for_stage(&self, stage: Stage) -> Self {
        Self {
            session_id: self.session_id.clone(),
            stage: stage.as_str(),
        }
    }

    /// Log the start of a stage request.
    pub fn log_start(&self, message: &str) {
        info!(
            session_id = %self.session_id,
            stage = self.stage,
            "Stage started: {}", message
        );
    }

    /// Log an intermediate step of a stage request.
    pub fn log_progress(&self, message: &str) {
        info!(
            session_id = %self.session_id,
            stage = self.stage,
            "Stage progress: {}", message
        );
    }

    /// Log a recoverable problem during a stage request.
    pub fn log_warning(&self, message: &str) {
        warn!(
            session_id = %self.session_id,
            stage = self.stage,
            "Stage warning: {}", message
        );
    }

    /// Log a stage failure that is surfaced to the user.
    pub fn log_error(&self, message: &str) {
        error!(
            session_id = %self.session_id,
            stage = self.stage,
            "Stage error: {}", message
        );
    }

    /// Log the successful end of a stage request.
    pub fn log_completion(&self, message: &str) {
        info!(
            session_id = %self.session_id,
            stage = self.stage,
            "Stage completed: {}", message
        );
    }

    /// Session token this logger is bound to.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Stage name as it appears in the `stage` field.
    pub fn stage(&self) -> &str {
        self.stage
    }

    /// Create a tracing span for work that spans several awaits of this stage.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "stage",
            session_id = %self.session_id,
            stage = self.stage
        )
    }
}
