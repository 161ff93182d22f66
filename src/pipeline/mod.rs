// ABOUTME: Deployment pipeline: state machine, health polling, rollback and retention.
// ABOUTME: Collaborators are injected; nothing here talks to the outside world directly.

mod cleanup;
mod error;
mod guard;
mod health;
mod orchestrator;
mod result;
mod retention;
mod rollback;
mod state;
mod step_log;

pub use cleanup::{CleanupFailure, CleanupResult, cleanup_artifacts};
pub use error::{PipelineError, PipelineErrorKind, RollbackError};
pub use guard::{CANCELLED, DEADLINE_EXCEEDED, RunGuard};
pub use health::{HealthPolicy, HealthReport, HealthVerdict, await_healthy};
pub use orchestrator::{Collaborators, Orchestrator};
pub use result::{PipelineResult, PipelineRun, StepFailure};
pub use retention::select_for_removal;
pub use rollback::{RollbackOutcome, rollback, select_rollback_candidate};
pub use state::{Action, PipelineState};
pub use step_log::{StepEntry, StepLog, StepOutcome};
