//! Structured run logging utilities.
//!
//! Provides consistent, structured logging for planner runs with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};
use broll_models::RunId;

/// Run logger for structured logging with consistent formatting.
///
/// Attaches the run ID and the current phase to every event.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    phase: String,
}

impl RunLogger {
    /// Create a new logger for a run and phase (e.g. "analysis", "suggestions").
    pub fn new(run_id: &RunId, phase: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            phase: phase.to_string(),
        }
    }

    /// Same run, different phase.
    pub fn for_phase(&self, phase: &str) -> Self {
        Self {
            run_id: self.run_id.clone(),
            phase: phase.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            phase = %self.phase,
            "Run started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            phase = %self.phase,
            "Run progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            phase = %self.phase,
            "Run warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            phase = %self.phase,
            "Run error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            phase = %self.phase,
            "Run completed: {}", message
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn phase(&self) -> &str {
        &self.phase
    }

    /// Create a tracing span for this run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "run",
            run_id = %self.run_id,
            phase = %self.phase
        )
    }
}
