// ABOUTME: Health endpoint polling configuration.
// ABOUTME: Defines the probe URL, attempt budget and backoff with sensible defaults.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct HealthcheckConfig {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Per-request timeout. Falls back to the environment's default when unset.
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Run a bounded health pass after a rollback redeploy.
    #[serde(default)]
    pub verify_rollback: bool,

    #[serde(default = "default_rollback_attempts")]
    pub rollback_attempts: u32,
}

fn default_url() -> String {
    "http://localhost:5000/health".to_string()
}

fn default_max_attempts() -> u32 {
    30
}

fn default_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_rollback_attempts() -> u32 {
    6
}

impl Default for HealthcheckConfig {
    fn default() -> Self {
        HealthcheckConfig {
            url: default_url(),
            max_attempts: default_max_attempts(),
            interval: default_interval(),
            timeout: None,
            verify_rollback: false,
            rollback_attempts: default_rollback_attempts(),
        }
    }
}
