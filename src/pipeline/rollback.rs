// ABOUTME: Rollback to the version deployed before the failed one.
// ABOUTME: Picks the second most recent artifact and redeploys it through the deploy target.

use serde::Serialize;

use super::RollbackError;
use crate::collaborators::{ArtifactRecord, ArtifactStore, DeployTarget};
use crate::config::Settings;
use crate::types::Version;

/// What a successful rollback restored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollbackOutcome {
    pub selected: Version,
    /// Post-rollback health result; `None` when verification is disabled.
    pub verified: Option<bool>,
}

/// Choose the version to restore from a most-recent-first list.
///
/// The head of the list is assumed to be the version that just failed. The
/// candidate is the second entry, and never the failed version itself.
pub fn select_rollback_candidate(
    records: &[ArtifactRecord],
    current: &Version,
) -> Result<Version, RollbackError> {
    let no_prior = || RollbackError::NoPriorVersion {
        available: records.len(),
    };

    let candidate = records.get(1).ok_or_else(no_prior)?;
    if &candidate.version == current {
        return Err(no_prior());
    }
    Ok(candidate.version.clone())
}

/// Redeploy the version before `current`.
///
/// The deploy target is not invoked when there is no prior version.
pub async fn rollback(
    store: &dyn ArtifactStore,
    target: &dyn DeployTarget,
    settings: &Settings,
    current: &Version,
) -> Result<RollbackOutcome, RollbackError> {
    let records = store
        .list(settings)
        .await
        .map_err(|e| RollbackError::ListFailed {
            message: e.to_string(),
        })?;

    let selected = select_rollback_candidate(&records, current)?;
    tracing::info!("rolling back {} to {}", current, selected);

    target
        .redeploy(settings, &selected)
        .await
        .map_err(|e| RollbackError::DeployFailed {
            version: selected.to_string(),
            message: e.to_string(),
        })?;

    Ok(RollbackOutcome {
        selected,
        verified: None,
    })
}
