// ABOUTME: Deploy target trait for applying a version to the running environment.
// ABOUTME: Implementations must be idempotent for repeated calls with the same version.

use async_trait::async_trait;

use crate::config::Settings;
use crate::types::Version;

#[async_trait]
pub trait DeployTarget: Send + Sync {
    /// Apply `version` to the running environment.
    async fn deploy(&self, settings: &Settings, version: &Version) -> Result<(), TargetError>;

    /// Reapply a previously deployed version during rollback.
    async fn redeploy(&self, settings: &Settings, version: &Version) -> Result<(), TargetError> {
        self.deploy(settings, version).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("deploy failed: {0}")]
    DeployFailed(String),
}
