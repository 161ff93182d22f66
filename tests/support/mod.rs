// ABOUTME: Test support utilities.
// ABOUTME: Scripted in-memory collaborators and a harness wiring them into an Orchestrator.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use rollout::collaborators::{
    ArtifactError, ArtifactRecord, ArtifactStore, DeployTarget, HealthProbe, ProbeError,
    SuiteOutcome, TargetError, TestError, TestSuite,
};
use rollout::config::{Config, Settings};
use rollout::pipeline::{Collaborators, Orchestrator};
use rollout::types::{Environment, Version};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Once;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("rollout=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn v(tag: &str) -> Version {
    Version::new(tag).unwrap()
}

pub fn versions(tags: &[&str]) -> Vec<Version> {
    tags.iter().map(|t| v(t)).collect()
}

/// Artifact store backed by a most-recent-first list of tags.
#[derive(Default)]
pub struct FakeStore {
    pub versions: Mutex<Vec<Version>>,
    /// Operations that fail: "build", "publish", "list", "prune".
    pub failing: Mutex<HashSet<&'static str>>,
    /// Versions whose removal fails.
    pub unremovable: Mutex<HashSet<Version>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn with_versions(tags: &[&str]) -> Self {
        let store = Self::default();
        *store.versions.lock() = versions(tags);
        store
    }

    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().insert(operation);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("remove ").map(str::to_string))
            .collect()
    }

    fn check(&self, operation: &'static str, call: String) -> Result<(), String> {
        self.calls.lock().push(call);
        if self.failing.lock().contains(operation) {
            Err(format!("{operation} exploded"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ArtifactStore for FakeStore {
    async fn list(&self, _settings: &Settings) -> Result<Vec<ArtifactRecord>, ArtifactError> {
        self.check("list", "list".to_string())
            .map_err(ArtifactError::ListFailed)?;
        Ok(self
            .versions
            .lock()
            .iter()
            .cloned()
            .map(ArtifactRecord::new)
            .collect())
    }

    async fn build(&self, _settings: &Settings, version: &Version) -> Result<(), ArtifactError> {
        self.check("build", format!("build {version}"))
            .map_err(ArtifactError::BuildFailed)
    }

    async fn publish(&self, _settings: &Settings, version: &Version) -> Result<(), ArtifactError> {
        self.check("publish", format!("publish {version}"))
            .map_err(ArtifactError::PublishFailed)
    }

    async fn remove(&self, _settings: &Settings, version: &Version) -> Result<(), ArtifactError> {
        self.calls.lock().push(format!("remove {version}"));
        if self.unremovable.lock().contains(version) {
            return Err(ArtifactError::RemoveFailed(format!("{version} is in use")));
        }
        self.versions.lock().retain(|v| v != version);
        Ok(())
    }

    async fn prune(&self, _settings: &Settings) -> Result<(), ArtifactError> {
        self.check("prune", "prune".to_string())
            .map_err(ArtifactError::RemoveFailed)
    }
}

/// Deploy target that records every call.
#[derive(Default)]
pub struct FakeTarget {
    pub fail_deploy: Mutex<bool>,
    pub fail_redeploy: Mutex<bool>,
    /// Time a forward deploy takes.
    pub delay: Mutex<Duration>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeTarget {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn redeploys(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("redeploy ").map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl DeployTarget for FakeTarget {
    async fn deploy(&self, _settings: &Settings, version: &Version) -> Result<(), TargetError> {
        self.calls.lock().push(format!("deploy {version}"));
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_deploy.lock() {
            return Err(TargetError::DeployFailed("compose up exited with 1".into()));
        }
        Ok(())
    }

    async fn redeploy(&self, _settings: &Settings, version: &Version) -> Result<(), TargetError> {
        self.calls.lock().push(format!("redeploy {version}"));
        if *self.fail_redeploy.lock() {
            return Err(TargetError::DeployFailed("compose up exited with 1".into()));
        }
        Ok(())
    }
}

/// Health probe scripted by attempt number.
pub struct FakeProbe {
    /// First attempt that reports healthy; `None` never does.
    pub healthy_from: Mutex<Option<u32>>,
    /// Report connection errors instead of unhealthy responses.
    pub errors: Mutex<bool>,
    pub attempts: Mutex<u32>,
}

impl FakeProbe {
    pub fn healthy_from(attempt: u32) -> Self {
        Self {
            healthy_from: Mutex::new(Some(attempt)),
            errors: Mutex::new(false),
            attempts: Mutex::new(0),
        }
    }

    pub fn never_healthy() -> Self {
        Self {
            healthy_from: Mutex::new(None),
            errors: Mutex::new(false),
            attempts: Mutex::new(0),
        }
    }

    pub fn attempts(&self) -> u32 {
        *self.attempts.lock()
    }
}

#[async_trait]
impl HealthProbe for FakeProbe {
    async fn probe(&self, _settings: &Settings) -> Result<bool, ProbeError> {
        let attempt = {
            let mut attempts = self.attempts.lock();
            *attempts += 1;
            *attempts
        };
        let healthy = self.healthy_from.lock().is_some_and(|from| attempt >= from);
        if !healthy && *self.errors.lock() {
            return Err(ProbeError::Connection("connection refused".into()));
        }
        Ok(healthy)
    }
}

/// Test suite with a fixed outcome.
pub struct FakeSuite {
    pub outcome: Mutex<Result<SuiteOutcome, String>>,
    pub runs: Mutex<u32>,
}

impl FakeSuite {
    pub fn passing() -> Self {
        Self {
            outcome: Mutex::new(Ok(SuiteOutcome::Passed)),
            runs: Mutex::new(0),
        }
    }
}

#[async_trait]
impl TestSuite for FakeSuite {
    async fn run(&self, _settings: &Settings, _version: &Version) -> Result<SuiteOutcome, TestError> {
        *self.runs.lock() += 1;
        self.outcome.lock().clone().map_err(TestError::Failed)
    }
}

pub const CONFIG: &str = r#"
namespace: shop
registry: registry.example.com
healthcheck:
  url: http://localhost:5000/health
retention:
  keep: 5
"#;

/// Fakes wired into an orchestrator for version `v3` unless changed.
pub struct Harness {
    pub config: Config,
    pub version: Version,
    pub store: Arc<FakeStore>,
    pub target: Arc<FakeTarget>,
    pub probe: Arc<FakeProbe>,
    pub suite: Arc<FakeSuite>,
    pub cancel: CancellationToken,
}

impl Harness {
    pub fn new(tags: &[&str]) -> Self {
        init_tracing();
        Self {
            config: Config::from_yaml(CONFIG).unwrap(),
            version: v(tags.first().copied().unwrap_or("v3")),
            store: Arc::new(FakeStore::with_versions(tags)),
            target: Arc::new(FakeTarget::default()),
            probe: Arc::new(FakeProbe::healthy_from(1)),
            suite: Arc::new(FakeSuite::passing()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_probe(mut self, probe: FakeProbe) -> Self {
        self.probe = Arc::new(probe);
        self
    }

    pub fn with_config(mut self, yaml: &str) -> Self {
        self.config = Config::from_yaml(yaml).unwrap();
        self
    }

    pub fn orchestrator(&self) -> Orchestrator {
        let collaborators = Collaborators {
            resolver: Arc::new(self.version.clone()),
            tests: self.suite.clone(),
            store: self.store.clone(),
            target: self.target.clone(),
            probe: self.probe.clone(),
        };
        Orchestrator::new(self.config.clone(), collaborators, self.cancel.clone())
    }

    pub fn settings(&self) -> Settings {
        self.config.for_environment(Environment::Production).unwrap()
    }
}
