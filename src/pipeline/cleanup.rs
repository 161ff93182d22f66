// ABOUTME: Best-effort removal of artifacts outside the retention window.
// ABOUTME: Failures are collected and reported, never propagated.

use serde::Serialize;

use super::retention::select_for_removal;
use crate::collaborators::ArtifactStore;
use crate::config::Settings;
use crate::diagnostics::{Diagnostics, Warning};
use crate::types::Version;

/// A version that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupFailure {
    pub version: Version,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupResult {
    pub removed: Vec<Version>,
    pub failed: Vec<CleanupFailure>,
}

impl CleanupResult {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Prune, then remove every version past `retention.keep`.
///
/// `deployed` is never removed, wherever the store lists it.
pub async fn cleanup_artifacts(
    store: &dyn ArtifactStore,
    settings: &Settings,
    deployed: &Version,
    diagnostics: &mut Diagnostics,
) -> CleanupResult {
    let mut result = CleanupResult::default();

    if let Err(e) = store.prune(settings).await {
        diagnostics.warn(Warning::prune_failure(format!("prune failed: {e}")));
    }

    let versions: Vec<Version> = match store.list(settings).await {
        Ok(records) => records.into_iter().map(|r| r.version).collect(),
        Err(e) => {
            diagnostics.warn(Warning::list_failure(format!(
                "skipping retention, {e}"
            )));
            return result;
        }
    };

    let doomed: Vec<Version> = select_for_removal(&versions, settings.retention.keep)
        .into_iter()
        .filter(|v| v != deployed)
        .collect();

    if doomed.is_empty() {
        tracing::debug!(
            "{} version(s) known, keeping {}; nothing to remove",
            versions.len(),
            settings.retention.keep
        );
        return result;
    }

    for version in doomed {
        match store.remove(settings, &version).await {
            Ok(()) => {
                tracing::info!("removed old version {}", version);
                result.removed.push(version);
            }
            Err(e) => {
                diagnostics.warn(Warning::cleanup_failure(format!(
                    "could not remove {version}: {e}"
                )));
                result.failed.push(CleanupFailure {
                    version,
                    error: e.to_string(),
                });
            }
        }
    }

    result
}
