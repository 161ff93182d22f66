// ABOUTME: Ordered record of what each pipeline step did.
// ABOUTME: Owned by a single run; one entry per executed step.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::PipelineState;

/// How a step ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    /// The step had nothing to do.
    Skipped(String),
    /// Best-effort work finished with problems.
    Degraded(String),
    Failed(String),
}

impl StepOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            StepOutcome::Succeeded => None,
            StepOutcome::Skipped(r) | StepOutcome::Degraded(r) | StepOutcome::Failed(r) => {
                Some(r)
            }
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Succeeded => f.write_str("succeeded"),
            StepOutcome::Skipped(r) => write!(f, "skipped ({r})"),
            StepOutcome::Degraded(r) => write!(f, "degraded ({r})"),
            StepOutcome::Failed(r) => write!(f, "failed ({r})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepEntry {
    pub step: PipelineState,
    pub outcome: StepOutcome,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct StepLog {
    entries: Vec<StepEntry>,
}

impl StepLog {
    pub fn record(&mut self, step: PipelineState, outcome: StepOutcome) {
        match &outcome {
            StepOutcome::Failed(_) => tracing::error!(%step, %outcome, "step finished"),
            StepOutcome::Degraded(_) => tracing::warn!(%step, %outcome, "step finished"),
            _ => tracing::info!(%step, %outcome, "step finished"),
        }
        self.entries.push(StepEntry {
            step,
            outcome,
            at: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[StepEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Steps in the order they were recorded.
    pub fn steps(&self) -> Vec<PipelineState> {
        self.entries.iter().map(|e| e.step).collect()
    }

    /// The first failed entry, if any.
    pub fn first_failure(&self) -> Option<&StepEntry> {
        self.entries.iter().find(|e| e.outcome.is_failed())
    }

    pub fn get(&self, step: PipelineState) -> Option<&StepEntry> {
        self.entries.iter().find(|e| e.step == step)
    }
}
