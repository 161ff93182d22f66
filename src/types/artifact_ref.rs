// ABOUTME: Fully qualified artifact reference built from registry, namespace and version.
// ABOUTME: Renders as registry/namespace:version for external build and publish commands.

use std::fmt;

use super::{Namespace, Version};

/// Registry value meaning "build locally, never push".
pub const LOCAL_REGISTRY: &str = "local";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    registry: String,
    namespace: Namespace,
    version: Version,
}

impl ArtifactRef {
    pub fn new(registry: impl Into<String>, namespace: Namespace, version: Version) -> Self {
        Self {
            registry: registry.into(),
            namespace,
            version,
        }
    }

    pub fn registry(&self) -> &str {
        &self.registry
    }

    /// Whether the registry is the local sentinel (publishing is a no-op).
    pub fn is_local(&self) -> bool {
        self.registry == LOCAL_REGISTRY
    }

    /// Repository part without the version, e.g. `registry.example.com/flask-app`.
    pub fn repository(&self) -> String {
        format!("{}/{}", self.registry.trim_end_matches('/'), self.namespace)
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository(), self.version)
    }
}
