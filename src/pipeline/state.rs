// ABOUTME: Pipeline states and the actions a run can perform.
// ABOUTME: Primary states run one collaborator operation each; the rest are terminal or recovery.

use serde::Serialize;
use std::fmt;

/// Where a pipeline run is, or which step a log entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Testing,
    Building,
    Publishing,
    Deploying,
    HealthChecking,
    Cleaning,
    Succeeded,
    Failed,
    RollingBack,
    RolledBack,
}

impl PipelineState {
    /// The forward steps of a deploy run, in order.
    pub const PRIMARY: [PipelineState; 5] = [
        PipelineState::Testing,
        PipelineState::Building,
        PipelineState::Publishing,
        PipelineState::Deploying,
        PipelineState::HealthChecking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Testing => "testing",
            PipelineState::Building => "building",
            PipelineState::Publishing => "publishing",
            PipelineState::Deploying => "deploying",
            PipelineState::HealthChecking => "health_checking",
            PipelineState::Cleaning => "cleaning",
            PipelineState::Succeeded => "succeeded",
            PipelineState::Failed => "failed",
            PipelineState::RollingBack => "rolling_back",
            PipelineState::RolledBack => "rolled_back",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Test, build, publish, deploy, verify health and clean up.
    #[default]
    Deploy,
    /// Redeploy the previous version.
    Rollback,
    /// Poll the health endpoint only.
    HealthCheck,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Deploy => "deploy",
            Action::Rollback => "rollback",
            Action::HealthCheck => "health-check",
        })
    }
}
