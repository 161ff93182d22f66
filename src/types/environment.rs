// ABOUTME: Target environment selector for a pipeline run.
// ABOUTME: Chooses which configuration overrides and defaults apply.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown environment: {0} (expected development, staging or production)")]
pub struct ParseEnvironmentError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    #[default]
    Production,
}

impl Environment {
    pub const ALL: [Environment; 3] = [
        Environment::Development,
        Environment::Staging,
        Environment::Production,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Replica count used when the configuration does not set one.
    pub fn default_replicas(&self) -> u32 {
        match self {
            Environment::Production => 3,
            Environment::Development | Environment::Staging => 1,
        }
    }

    /// Target domain used when the configuration does not set one.
    pub fn default_domain(&self) -> String {
        format!("{}.yourdomain.com", self.as_str())
    }

    /// Per-request health probe timeout used when the configuration does not set one.
    pub fn default_probe_timeout(&self) -> Duration {
        match self {
            Environment::Development => Duration::from_secs(1),
            Environment::Staging => Duration::from_secs(3),
            Environment::Production => Duration::from_secs(5),
        }
    }
}

impl FromStr for Environment {
    type Err = ParseEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Environment::ALL
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnvironmentError(s.to_string()))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
