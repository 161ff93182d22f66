// ABOUTME: Diagnostics accumulator for non-fatal warnings during a pipeline run.
// ABOUTME: Collects warnings that shouldn't change the outcome but should be shown to users.

use serde::Serialize;

/// Collects non-fatal warnings during pipeline operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// A non-fatal warning collected during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// An old artifact could not be removed.
    pub fn cleanup_failure(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::CleanupFailure,
            message: message.into(),
        }
    }

    /// The prune command failed.
    pub fn prune_failure(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::PruneFailure,
            message: message.into(),
        }
    }

    /// Artifacts could not be listed for retention.
    pub fn list_failure(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ListFailure,
            message: message.into(),
        }
    }

    /// The restored version did not pass its post-rollback health pass.
    pub fn rollback_unverified(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::RollbackUnverified,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Removing an old artifact failed (it stays in the store).
    CleanupFailure,
    /// Pruning unreferenced artifacts failed.
    PruneFailure,
    /// Listing artifacts for retention failed; nothing was removed.
    ListFailure,
    /// Post-rollback health verification did not pass.
    RollbackUnverified,
}
