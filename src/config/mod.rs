// ABOUTME: Configuration types and parsing for rollout.yml.
// ABOUTME: Handles YAML parsing, env var interpolation, and per-environment merging.

mod commands;
mod deserialize;
mod env_value;
mod healthcheck;
mod init;
mod retention;
mod settings;

pub use commands::{Argv, CommandList, CommandsConfig};
pub use env_value::{EnvValue, resolve_env_map};
pub use healthcheck::HealthcheckConfig;
pub use init::init_config;
pub use retention::RetentionConfig;
pub use settings::Settings;

use crate::error::{Error, Result};
use crate::types::{Environment, LOCAL_REGISTRY, Namespace};
use deserialize::deserialize_namespace;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "rollout.yml";
pub const CONFIG_FILENAME_ALT: &str = "rollout.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".rollout/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_namespace")]
    pub namespace: Namespace,

    #[serde(default = "default_registry")]
    pub registry: EnvValue,

    #[serde(default)]
    pub replicas: Option<u32>,

    #[serde(default)]
    pub domain: Option<String>,

    /// Overall wall-clock budget for the forward steps of a run.
    #[serde(default, with = "humantime_serde")]
    pub deadline: Option<Duration>,

    #[serde(default)]
    pub healthcheck: HealthcheckConfig,

    #[serde(default)]
    pub retention: RetentionConfig,

    #[serde(default)]
    pub commands: CommandsConfig,

    #[serde(default)]
    pub environments: HashMap<Environment, EnvironmentOverrides>,

    /// Directory external commands run in; set when the file is loaded.
    #[serde(skip)]
    pub project_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct EnvironmentOverrides {
    #[serde(default)]
    pub registry: Option<EnvValue>,

    #[serde(default)]
    pub replicas: Option<u32>,

    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default, with = "humantime_serde")]
    pub deadline: Option<Duration>,

    #[serde(default)]
    pub healthcheck: Option<HealthcheckConfig>,

    #[serde(default)]
    pub retention: Option<RetentionConfig>,

    #[serde(default)]
    pub env: HashMap<String, EnvValue>,
}

fn default_registry() -> EnvValue {
    EnvValue::Literal(LOCAL_REGISTRY.to_string())
}

impl Config {
    /// Parse a configuration. External commands run in the current directory
    /// until `load` or `discover` sets the project directory.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        config.project_dir = PathBuf::from(".");
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        config.project_dir = project_dir_for(path);
        Ok(config)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                let mut config = Self::load(path)?;
                config.project_dir = dir.to_path_buf();
                return Ok(config);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Resolve the configuration bundle for one environment.
    ///
    /// Environment overrides replace scalar values and whole sections;
    /// `env` maps are merged key by key. Env-var references are resolved here,
    /// once, so a run never observes a changing configuration.
    pub fn for_environment(&self, environment: Environment) -> Result<Settings> {
        let overrides = self
            .environments
            .get(&environment)
            .cloned()
            .unwrap_or_default();

        let registry = overrides
            .registry
            .as_ref()
            .unwrap_or(&self.registry)
            .resolve()?;
        let replicas = overrides
            .replicas
            .or(self.replicas)
            .unwrap_or_else(|| environment.default_replicas());
        let domain = overrides
            .domain
            .or_else(|| self.domain.clone())
            .unwrap_or_else(|| environment.default_domain());
        let healthcheck = overrides
            .healthcheck
            .unwrap_or_else(|| self.healthcheck.clone());
        let retention = overrides.retention.unwrap_or(self.retention);

        let mut env = self.commands.env.clone();
        for (k, v) in overrides.env {
            env.insert(k, v);
        }
        let command_env = resolve_env_map(&env)?;

        let settings = Settings {
            environment,
            namespace: self.namespace.clone(),
            registry,
            replicas,
            domain,
            healthcheck,
            retention,
            commands: self.commands.clone(),
            command_env,
            deadline: overrides.deadline.or(self.deadline),
            project_dir: self.project_dir.clone(),
        };
        validate(&settings)?;

        Ok(settings)
    }

    pub fn template() -> Self {
        Config {
            namespace: Namespace::new("my-app").unwrap(),
            registry: default_registry(),
            replicas: None,
            domain: None,
            deadline: None,
            healthcheck: HealthcheckConfig::default(),
            retention: RetentionConfig::default(),
            commands: CommandsConfig::default(),
            environments: HashMap::new(),
            project_dir: PathBuf::from("."),
        }
    }
}

fn validate(settings: &Settings) -> Result<()> {
    if settings.registry.trim().is_empty() {
        return Err(Error::InvalidConfig("registry cannot be empty".to_string()));
    }
    if settings.replicas == 0 {
        return Err(Error::InvalidConfig(
            "replicas must be at least 1".to_string(),
        ));
    }
    if settings.healthcheck.max_attempts == 0 {
        return Err(Error::InvalidConfig(
            "healthcheck.max_attempts must be at least 1".to_string(),
        ));
    }
    if settings.healthcheck.verify_rollback && settings.healthcheck.rollback_attempts == 0 {
        return Err(Error::InvalidConfig(
            "healthcheck.rollback_attempts must be at least 1".to_string(),
        ));
    }
    if settings.retention.keep == 0 {
        return Err(Error::InvalidConfig(
            "retention.keep must be at least 1 (the deployed version is always kept)"
                .to_string(),
        ));
    }
    if !settings.healthcheck.url.starts_with("http://") {
        return Err(Error::InvalidConfig(format!(
            "healthcheck.url must be an http:// URL (TLS is not supported), got {}",
            settings.healthcheck.url
        )));
    }
    Ok(())
}

/// `.rollout/config.yml` lives one level below the project root.
fn project_dir_for(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if parent.file_name().is_some_and(|name| name == ".rollout") {
        parent.parent().unwrap_or(parent).to_path_buf()
    } else {
        parent.to_path_buf()
    }
}
