// ABOUTME: Health polling with a fixed attempt budget and interval.
// ABOUTME: Sleeps only between attempts and stops early on cancellation.

use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::collaborators::HealthProbe;
use crate::config::{HealthcheckConfig, Settings};

/// Attempt budget for one polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(10),
        }
    }
}

impl HealthPolicy {
    pub fn from_config(config: &HealthcheckConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            interval: config.interval,
        }
    }

    /// The shorter pass run after a rollback redeploy.
    pub fn for_rollback(config: &HealthcheckConfig) -> Self {
        Self {
            max_attempts: config.rollback_attempts,
            interval: config.interval,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthVerdict {
    Healthy,
    Unhealthy,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub verdict: HealthVerdict,
    /// Probe calls made.
    pub attempts: u32,
    /// Last probe error, when the last attempt failed at the connection level.
    pub last_error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.verdict == HealthVerdict::Healthy
    }

    /// Failure reason suitable for the step log.
    pub fn describe(&self) -> String {
        match (&self.verdict, &self.last_error) {
            (HealthVerdict::Healthy, _) => format!("healthy after {} attempt(s)", self.attempts),
            (HealthVerdict::Cancelled, _) => {
                format!("cancelled after {} attempt(s)", self.attempts)
            }
            (HealthVerdict::Unhealthy, Some(err)) => format!(
                "unhealthy after {} attempt(s), last error: {}",
                self.attempts, err
            ),
            (HealthVerdict::Unhealthy, None) => {
                format!("unhealthy after {} attempt(s)", self.attempts)
            }
        }
    }
}

/// Poll `probe` until it reports healthy or the budget runs out.
///
/// Sleeps `interval` between attempts but not after the last one, so an
/// endpoint that never becomes healthy costs `(max_attempts - 1) * interval`
/// plus the probe time. Probe errors count as unhealthy.
pub async fn await_healthy(
    probe: &dyn HealthProbe,
    settings: &Settings,
    policy: &HealthPolicy,
    cancel: &CancellationToken,
) -> HealthReport {
    let mut attempts = 0;
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts {
        if cancel.is_cancelled() {
            return cancelled(attempts, last_error);
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return cancelled(attempts, last_error),
            result = probe.probe(settings) => result,
        };
        attempts = attempt;

        let healthy = match result {
            Ok(healthy) => {
                last_error = None;
                healthy
            }
            Err(e) => {
                tracing::debug!("health probe attempt {} failed: {}", attempt, e);
                last_error = Some(e.to_string());
                false
            }
        };

        tracing::debug!(attempt, healthy, "health probe");

        if healthy {
            tracing::info!("service healthy after {} attempt(s)", attempt);
            return HealthReport {
                verdict: HealthVerdict::Healthy,
                attempts,
                last_error: None,
            };
        }

        if attempt < policy.max_attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return cancelled(attempts, last_error),
                _ = tokio::time::sleep(policy.interval) => {}
            }
        }
    }

    HealthReport {
        verdict: HealthVerdict::Unhealthy,
        attempts,
        last_error,
    }
}

fn cancelled(attempts: u32, last_error: Option<String>) -> HealthReport {
    HealthReport {
        verdict: HealthVerdict::Cancelled,
        attempts,
        last_error,
    }
}
