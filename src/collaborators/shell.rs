// ABOUTME: Command-backed implementations of the artifact store, deploy target and test suite.
// ABOUTME: Each operation renders its configured command list and runs it in the project dir.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};

use super::command::{CommandContext, CommandRunner};
use super::traits::{
    ArtifactError, ArtifactRecord, ArtifactStore, DeployTarget, SuiteOutcome, TargetError,
    TestError, TestSuite,
};
use crate::config::Settings;
use crate::types::Version;

/// Artifact store driven by `commands.build`, `publish`, `list` and `remove`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandArtifactStore;

#[async_trait]
impl ArtifactStore for CommandArtifactStore {
    async fn list(&self, settings: &Settings) -> Result<Vec<ArtifactRecord>, ArtifactError> {
        let stdout = CommandRunner::new(settings)
            .run(&settings.commands.list, &CommandContext::new(settings))
            .await
            .map_err(|e| ArtifactError::ListFailed(e.to_string()))?;
        Ok(parse_artifact_list(&stdout))
    }

    async fn build(&self, settings: &Settings, version: &Version) -> Result<(), ArtifactError> {
        CommandRunner::new(settings)
            .run(
                &settings.commands.build,
                &CommandContext::for_version(settings, version),
            )
            .await
            .map_err(|e| ArtifactError::BuildFailed(e.to_string()))?;
        Ok(())
    }

    async fn publish(
        &self,
        settings: &Settings,
        version: &Version,
    ) -> Result<(), ArtifactError> {
        CommandRunner::new(settings)
            .run(
                &settings.commands.publish,
                &CommandContext::for_version(settings, version),
            )
            .await
            .map_err(|e| ArtifactError::PublishFailed(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, settings: &Settings, version: &Version) -> Result<(), ArtifactError> {
        CommandRunner::new(settings)
            .run(
                &settings.commands.remove,
                &CommandContext::for_version(settings, version),
            )
            .await
            .map_err(|e| ArtifactError::RemoveFailed(e.to_string()))?;
        Ok(())
    }

    async fn prune(&self, settings: &Settings) -> Result<(), ArtifactError> {
        let Some(prune) = &settings.commands.prune else {
            return Ok(());
        };
        CommandRunner::new(settings)
            .run(prune, &CommandContext::new(settings))
            .await
            .map_err(|e| ArtifactError::RemoveFailed(e.to_string()))?;
        Ok(())
    }
}

/// Deploy target driven by `commands.deploy` (and `commands.rollback` for redeploys).
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandDeployTarget;

#[async_trait]
impl DeployTarget for CommandDeployTarget {
    async fn deploy(&self, settings: &Settings, version: &Version) -> Result<(), TargetError> {
        CommandRunner::new(settings)
            .run(
                &settings.commands.deploy,
                &CommandContext::for_version(settings, version),
            )
            .await
            .map_err(|e| TargetError::DeployFailed(e.to_string()))?;
        Ok(())
    }

    async fn redeploy(&self, settings: &Settings, version: &Version) -> Result<(), TargetError> {
        CommandRunner::new(settings)
            .run(
                settings.commands.rollback_or_deploy(),
                &CommandContext::for_version(settings, version),
            )
            .await
            .map_err(|e| TargetError::DeployFailed(e.to_string()))?;
        Ok(())
    }
}

/// Test suite driven by `commands.test`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandTestSuite;

#[async_trait]
impl TestSuite for CommandTestSuite {
    async fn run(&self, settings: &Settings, version: &Version) -> Result<SuiteOutcome, TestError> {
        let Some(test) = &settings.commands.test else {
            return Ok(SuiteOutcome::NotConfigured);
        };
        CommandRunner::new(settings)
            .run(test, &CommandContext::for_version(settings, version))
            .await
            .map_err(|e| TestError::Failed(e.to_string()))?;
        Ok(SuiteOutcome::Passed)
    }
}

/// Parse `list` output: one `<version>[ <created>]` per line.
///
/// Headers, blank lines, `<none>` tags, unparseable versions and duplicates are
/// dropped. If every record has a creation time the result is sorted newest
/// first; otherwise the reported order is kept.
pub fn parse_artifact_list(stdout: &str) -> Vec<ArtifactRecord> {
    let mut records: Vec<ArtifactRecord> = Vec::new();

    for line in stdout.lines() {
        let line = line.trim();
        let Some((tag, rest)) = split_first_field(line) else {
            continue;
        };
        if tag == "<none>" || tag.eq_ignore_ascii_case("tag") || tag.eq_ignore_ascii_case("version")
        {
            continue;
        }

        let version = match Version::new(tag) {
            Ok(version) => version,
            Err(e) => {
                tracing::warn!("ignoring artifact tag {:?}: {}", tag, e);
                continue;
            }
        };

        if records.iter().any(|r| r.version == version) {
            continue;
        }

        records.push(match parse_created(rest) {
            Some(created) => ArtifactRecord::created_at(version, created),
            None => ArtifactRecord::new(version),
        });
    }

    if !records.is_empty() && records.iter().all(|r| r.created.is_some()) {
        records.sort_by(|a, b| b.created.cmp(&a.created));
    }

    records
}

fn split_first_field(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    match line.split_once(char::is_whitespace) {
        Some((first, rest)) => Some((first, rest.trim())),
        None => Some((line, "")),
    }
}

/// Accepts RFC 3339 or docker's `2024-01-15 10:30:00 +0000 UTC`.
fn parse_created(text: &str) -> Option<DateTime<Utc>> {
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    let fields: Vec<&str> = text.split_whitespace().take(3).collect();
    let joined = fields.join(" ");
    if let Ok(parsed) = DateTime::parse_from_str(&joined, "%Y-%m-%d %H:%M:%S %z") {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&fields[..fields.len().min(2)].join(" "), "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
