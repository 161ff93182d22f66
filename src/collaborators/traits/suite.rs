// ABOUTME: Test suite trait run before a version is built.
// ABOUTME: A failing suite stops the pipeline before anything is published.

use async_trait::async_trait;

use crate::config::Settings;
use crate::types::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteOutcome {
    Passed,
    /// Nothing to run for this project.
    NotConfigured,
}

#[async_trait]
pub trait TestSuite: Send + Sync {
    async fn run(&self, settings: &Settings, version: &Version) -> Result<SuiteOutcome, TestError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TestError {
    #[error("tests failed: {0}")]
    Failed(String),
}
