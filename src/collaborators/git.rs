// ABOUTME: Version resolution from the project's git history.
// ABOUTME: Uses `git describe --tags --always`, falling back to the latest sentinel.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use super::traits::VersionResolver;
use crate::types::Version;

/// Resolves the version from the nearest tag or abbreviated commit.
#[derive(Debug, Clone)]
pub struct GitDescribe {
    dir: PathBuf,
}

impl GitDescribe {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn describe(&self) -> Result<Version, String> {
        let output = Command::new("git")
            .args(["describe", "--tags", "--always"])
            .current_dir(&self.dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| format!("failed to run git: {e}"))?;

        if !output.status.success() {
            return Err(format!(
                "git describe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let described = String::from_utf8_lossy(&output.stdout);
        Version::new(described.trim()).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl VersionResolver for GitDescribe {
    async fn resolve(&self) -> Version {
        match self.describe().await {
            Ok(version) => version,
            Err(reason) => {
                tracing::warn!(
                    "could not derive version from git ({}), using {}",
                    reason,
                    Version::latest()
                );
                Version::latest()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn falls_back_to_latest_outside_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let version = GitDescribe::new(dir.path()).resolve().await;
        assert!(version.is_latest());
    }
}
