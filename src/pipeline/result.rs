// ABOUTME: The per-run working state and the report it is consumed into.
// ABOUTME: PipelineRun owns the step log; PipelineResult is what callers and output see.

use serde::Serialize;

use super::{
    Action, CleanupResult, PipelineError, PipelineState, RollbackOutcome, StepLog, StepOutcome,
};
use crate::config::Settings;
use crate::diagnostics::{Diagnostics, Warning};
use crate::types::{Environment, Version};

/// A forward step that failed, before the rollback verdict is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: PipelineState,
    pub reason: String,
}

/// Mutable state of one run. Created at run start, consumed by `finish`.
#[derive(Debug)]
pub struct PipelineRun {
    pub action: Action,
    pub version: Version,
    pub settings: Settings,
    pub log: StepLog,
    pub diagnostics: Diagnostics,
    state: PipelineState,
}

impl PipelineRun {
    pub fn new(action: Action, settings: Settings, version: Version) -> Self {
        Self {
            action,
            version,
            settings,
            log: StepLog::default(),
            diagnostics: Diagnostics::default(),
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn enter(&mut self, state: PipelineState) {
        tracing::debug!("{} -> {}", self.state, state);
        self.state = state;
    }

    /// Record the current step's outcome. A failure leaves the run in `Failed`.
    pub fn settle(&mut self, outcome: Result<StepOutcome, String>) -> Result<(), StepFailure> {
        let step = self.state;
        match outcome {
            Ok(outcome) => {
                self.log.record(step, outcome);
                Ok(())
            }
            Err(reason) => {
                self.log.record(step, StepOutcome::Failed(reason.clone()));
                self.enter(PipelineState::Failed);
                Err(StepFailure { step, reason })
            }
        }
    }

    pub fn finish(
        mut self,
        final_state: PipelineState,
        failure: Option<PipelineError>,
        rollback: Option<RollbackOutcome>,
        cleanup: Option<CleanupResult>,
    ) -> PipelineResult {
        self.enter(final_state);
        let success = match self.action {
            Action::Rollback => final_state == PipelineState::RolledBack,
            Action::Deploy | Action::HealthCheck => final_state == PipelineState::Succeeded,
        };

        PipelineResult {
            action: self.action,
            success,
            final_state,
            environment: self.settings.environment,
            version: self.version,
            step_log: self.log,
            failure,
            rollback,
            cleanup,
            warnings: self.diagnostics.into_warnings(),
        }
    }
}

/// Outcome of a run.
///
/// For a deploy, `RolledBack` is still a failure; for a standalone rollback it
/// is the successful end state.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub action: Action,
    pub success: bool,
    pub final_state: PipelineState,
    pub environment: Environment,
    pub version: Version,
    pub step_log: StepLog,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<PipelineError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollback: Option<RollbackOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<CleanupResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}
