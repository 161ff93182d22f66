// ABOUTME: Configuration bundle resolved for a single environment.
// ABOUTME: Read-only for the lifetime of a pipeline run.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use super::{CommandsConfig, HealthcheckConfig, RetentionConfig};
use crate::types::{ArtifactRef, Environment, Namespace, Version};

/// Everything a pipeline run and its collaborators read about the target environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: Environment,
    pub namespace: Namespace,
    pub registry: String,
    pub replicas: u32,
    pub domain: String,
    pub healthcheck: HealthcheckConfig,
    pub retention: RetentionConfig,
    pub commands: CommandsConfig,
    /// `commands.env` with every value resolved.
    pub command_env: HashMap<String, String>,
    pub deadline: Option<Duration>,
    /// Working directory for external commands.
    pub project_dir: PathBuf,
}

impl Settings {
    /// Artifact reference for a version in this environment's registry.
    pub fn artifact(&self, version: &Version) -> ArtifactRef {
        ArtifactRef::new(&self.registry, self.namespace.clone(), version.clone())
    }

    /// Per-request probe timeout, defaulting by environment.
    pub fn probe_timeout(&self) -> Duration {
        self.healthcheck
            .timeout
            .unwrap_or_else(|| self.environment.default_probe_timeout())
    }

    /// Project name handed to compose so environments do not collide.
    pub fn compose_project_name(&self) -> String {
        self.namespace.compose_project(self.environment)
    }
}
