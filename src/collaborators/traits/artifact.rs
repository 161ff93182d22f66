// ABOUTME: Artifact store trait for versioned build outputs.
// ABOUTME: List, build, publish and remove artifacts under the configured namespace.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Settings;
use crate::types::Version;

/// One artifact as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRecord {
    pub version: Version,
    pub created: Option<DateTime<Utc>>,
}

impl ArtifactRecord {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            created: None,
        }
    }

    pub fn created_at(version: Version, created: DateTime<Utc>) -> Self {
        Self {
            version,
            created: Some(created),
        }
    }
}

/// Builds, publishes, lists and removes artifacts.
///
/// Every operation is independently fallible and may be slow.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// All known versions for the namespace, most recent first.
    async fn list(&self, settings: &Settings) -> Result<Vec<ArtifactRecord>, ArtifactError>;

    async fn build(&self, settings: &Settings, version: &Version) -> Result<(), ArtifactError>;

    async fn publish(&self, settings: &Settings, version: &Version)
    -> Result<(), ArtifactError>;

    async fn remove(&self, settings: &Settings, version: &Version) -> Result<(), ArtifactError>;

    /// Housekeeping run before retention removals. Best-effort.
    async fn prune(&self, _settings: &Settings) -> Result<(), ArtifactError> {
        Ok(())
    }
}

/// Errors from artifact store operations.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("listing artifacts failed: {0}")]
    ListFailed(String),

    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("publish failed: {0}")]
    PublishFailed(String),

    #[error("remove failed: {0}")]
    RemoveFailed(String),
}
