// ABOUTME: Health probe trait for the deployed service's readiness signal.
// ABOUTME: A single probe attempt yields healthy, unhealthy, or a connection-level fault.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::Settings;

#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// One probe attempt. `Ok(false)` means the endpoint answered but is not ready.
    async fn probe(&self, settings: &Settings) -> Result<bool, ProbeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("invalid health URL {0}")]
    InvalidUrl(String),

    #[error("unsupported health URL {0}: only plain http:// is probed, TLS is not supported")]
    UnsupportedScheme(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(String),
}
