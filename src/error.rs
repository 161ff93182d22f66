// ABOUTME: Application-wide error types for rollout.
// ABOUTME: Uses thiserror for configuration and startup failures.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{NamespaceError, VersionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("{0} already exists (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid namespace: {0}")]
    Namespace(#[from] NamespaceError),

    #[error("invalid version: {0}")]
    Version(#[from] VersionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
