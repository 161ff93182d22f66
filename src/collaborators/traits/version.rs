// ABOUTME: Version resolver trait for deriving the deployable version.
// ABOUTME: Resolution never fails; implementations fall back to the latest sentinel.

use async_trait::async_trait;

use crate::types::Version;

#[async_trait]
pub trait VersionResolver: Send + Sync {
    async fn resolve(&self) -> Version;
}

/// A fixed version resolves to itself.
#[async_trait]
impl VersionResolver for Version {
    async fn resolve(&self) -> Version {
        self.clone()
    }
}
