// ABOUTME: Terminal failures of a pipeline run and of the rollback step.
// ABOUTME: Both serialize so they can be carried in the JSON run report.

use serde::Serialize;

use super::PipelineState;

/// Why the rollback step could not restore a prior version.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RollbackError {
    /// Nothing older than the failed version is known.
    #[error("no prior version to roll back to ({available} known)")]
    NoPriorVersion { available: usize },

    #[error("could not list artifacts: {message}")]
    ListFailed { message: String },

    #[error("redeploying {version} failed: {message}")]
    DeployFailed { version: String, message: String },
}

/// Why a run did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineError {
    /// A primary step failed; the rollback may still have restored service.
    #[error("{step} failed: {reason}")]
    Step { step: PipelineState, reason: String },

    /// A primary step failed and so did the rollback that followed.
    #[error("{step} failed: {reason}; rollback failed: {cause}")]
    Rollback {
        step: PipelineState,
        reason: String,
        cause: RollbackError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineErrorKind {
    StepFailure,
    RollbackFailure,
    NoPriorVersion,
}

impl PipelineError {
    pub fn kind(&self) -> PipelineErrorKind {
        match self {
            PipelineError::Step { .. } => PipelineErrorKind::StepFailure,
            PipelineError::Rollback {
                cause: RollbackError::NoPriorVersion { .. },
                ..
            } => PipelineErrorKind::NoPriorVersion,
            PipelineError::Rollback { .. } => PipelineErrorKind::RollbackFailure,
        }
    }

    /// The step whose failure ended the forward run.
    pub fn step(&self) -> PipelineState {
        match self {
            PipelineError::Step { step, .. } | PipelineError::Rollback { step, .. } => *step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_distinguishes_missing_prior_version() {
        let err = PipelineError::Rollback {
            step: PipelineState::HealthChecking,
            reason: "unhealthy".into(),
            cause: RollbackError::NoPriorVersion { available: 1 },
        };
        assert_eq!(err.kind(), PipelineErrorKind::NoPriorVersion);
        assert_eq!(err.step(), PipelineState::HealthChecking);

        let err = PipelineError::Rollback {
            step: PipelineState::Deploying,
            reason: "compose".into(),
            cause: RollbackError::ListFailed {
                message: "docker down".into(),
            },
        };
        assert_eq!(err.kind(), PipelineErrorKind::RollbackFailure);
    }

    #[test]
    fn display_names_step_and_cause() {
        let err = PipelineError::Rollback {
            step: PipelineState::Deploying,
            reason: "exit 1".into(),
            cause: RollbackError::NoPriorVersion { available: 0 },
        };
        assert_eq!(
            err.to_string(),
            "deploying failed: exit 1; rollback failed: no prior version to roll back to (0 known)"
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let err = PipelineError::Step {
            step: PipelineState::Building,
            reason: "docker build exited with 1".into(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "step");
        assert_eq!(json["step"], "building");
    }
}
