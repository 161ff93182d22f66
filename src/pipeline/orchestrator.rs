// ABOUTME: The pipeline state machine driving tests, build, publish, deploy, health and cleanup.
// ABOUTME: Any forward failure triggers exactly one rollback attempt; cleanup is best-effort.

use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::cleanup::cleanup_artifacts;
use super::guard::RunGuard;
use super::health::{HealthPolicy, HealthVerdict, await_healthy};
use super::result::{PipelineRun, StepFailure};
use super::rollback::rollback;
use super::{Action, PipelineError, PipelineResult, PipelineState, StepOutcome};
use crate::collaborators::{
    ArtifactStore, CommandArtifactStore, CommandDeployTarget, CommandTestSuite, DeployTarget,
    GitDescribe, HealthProbe, HttpHealthProbe, SuiteOutcome, TestSuite, VersionResolver,
};
use crate::config::Config;
use crate::diagnostics::Warning;
use crate::error::Result;
use crate::types::{Environment, Version};

/// The external capabilities a run drives.
#[derive(Clone)]
pub struct Collaborators {
    pub resolver: Arc<dyn VersionResolver>,
    pub tests: Arc<dyn TestSuite>,
    pub store: Arc<dyn ArtifactStore>,
    pub target: Arc<dyn DeployTarget>,
    pub probe: Arc<dyn HealthProbe>,
}

impl Collaborators {
    /// Command-backed collaborators with git version resolution in `project_dir`.
    pub fn commands(project_dir: &Path) -> Self {
        Self {
            resolver: Arc::new(GitDescribe::new(project_dir)),
            tests: Arc::new(CommandTestSuite),
            store: Arc::new(CommandArtifactStore),
            target: Arc::new(CommandDeployTarget),
            probe: Arc::new(HttpHealthProbe),
        }
    }
}

/// Runs pipeline actions against one configuration.
///
/// Holds no mutable state; each call builds its own [`PipelineRun`].
pub struct Orchestrator {
    config: Config,
    collaborators: Collaborators,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(config: Config, collaborators: Collaborators, cancel: CancellationToken) -> Self {
        Self {
            config,
            collaborators,
            cancel,
        }
    }

    pub async fn execute(
        &self,
        action: Action,
        environment: Environment,
        version: Option<Version>,
    ) -> Result<PipelineResult> {
        match action {
            Action::Deploy => self.run(environment, version).await,
            Action::Rollback => self.rollback(environment, version).await,
            Action::HealthCheck => self.health_check(environment).await,
        }
    }

    /// Full deploy: test, build, publish, deploy, health check, clean up.
    ///
    /// Errors only when the configuration cannot be resolved for
    /// `environment`; every pipeline outcome is in the returned result.
    pub async fn run(
        &self,
        environment: Environment,
        version: Option<Version>,
    ) -> Result<PipelineResult> {
        let mut run = self.start(Action::Deploy, environment, version).await?;
        tracing::info!(
            "deploying {} {} to {}",
            run.settings.namespace,
            run.version,
            environment
        );

        let forward = {
            let guard = RunGuard::new(&self.cancel, run.settings.deadline);
            self.forward(&mut run, &guard).await
        };

        let result = match forward {
            Ok(()) => {
                run.enter(PipelineState::Cleaning);
                let cleanup = cleanup_artifacts(
                    &*self.collaborators.store,
                    &run.settings,
                    &run.version,
                    &mut run.diagnostics,
                )
                .await;
                let outcome = if cleanup.is_clean() {
                    StepOutcome::Succeeded
                } else {
                    StepOutcome::Degraded(format!(
                        "{} of {} removal(s) failed",
                        cleanup.failed.len(),
                        cleanup.failed.len() + cleanup.removed.len()
                    ))
                };
                run.log.record(PipelineState::Cleaning, outcome);
                run.finish(PipelineState::Succeeded, None, None, Some(cleanup))
            }
            Err(failure) => self.recover(run, failure).await,
        };

        Ok(result)
    }

    /// Standalone rollback to the version before `version` (or before the
    /// resolved version when none is given).
    pub async fn rollback(
        &self,
        environment: Environment,
        version: Option<Version>,
    ) -> Result<PipelineResult> {
        let run = self.start(Action::Rollback, environment, version).await?;
        let failure = StepFailure {
            step: PipelineState::RollingBack,
            reason: "manual rollback".to_string(),
        };
        Ok(self.recover(run, failure).await)
    }

    /// Standalone health check using the configured polling budget.
    pub async fn health_check(&self, environment: Environment) -> Result<PipelineResult> {
        let mut run = self.start(Action::HealthCheck, environment, None).await?;
        let guard = RunGuard::new(&self.cancel, run.settings.deadline);

        match self.check_health(&mut run, &guard).await {
            Ok(()) => Ok(run.finish(PipelineState::Succeeded, None, None, None)),
            Err(StepFailure { step, reason }) => Ok(run.finish(
                PipelineState::Failed,
                Some(PipelineError::Step { step, reason }),
                None,
                None,
            )),
        }
    }

    async fn start(
        &self,
        action: Action,
        environment: Environment,
        version: Option<Version>,
    ) -> Result<PipelineRun> {
        let settings = self.config.for_environment(environment)?;
        let version = match version {
            Some(version) => version,
            None => self.collaborators.resolver.resolve().await,
        };
        Ok(PipelineRun::new(action, settings, version))
    }

    async fn forward(
        &self,
        run: &mut PipelineRun,
        guard: &RunGuard,
    ) -> std::result::Result<(), StepFailure> {
        let c = &self.collaborators;

        run.enter(PipelineState::Testing);
        let outcome = guard
            .run(c.tests.run(&run.settings, &run.version))
            .await
            .map(|suite| match suite {
                SuiteOutcome::Passed => StepOutcome::Succeeded,
                SuiteOutcome::NotConfigured => {
                    StepOutcome::Skipped("no test command configured".to_string())
                }
            });
        run.settle(outcome)?;

        run.enter(PipelineState::Building);
        let outcome = guard
            .run(c.store.build(&run.settings, &run.version))
            .await
            .map(|()| StepOutcome::Succeeded);
        run.settle(outcome)?;

        run.enter(PipelineState::Publishing);
        let artifact = run.settings.artifact(&run.version);
        let outcome = if artifact.is_local() {
            Ok(StepOutcome::Skipped(format!(
                "registry is {}, nothing to push",
                artifact.registry()
            )))
        } else {
            guard
                .run(c.store.publish(&run.settings, &run.version))
                .await
                .map(|()| StepOutcome::Succeeded)
        };
        run.settle(outcome)?;

        run.enter(PipelineState::Deploying);
        let outcome = guard
            .run(c.target.deploy(&run.settings, &run.version))
            .await
            .map(|()| StepOutcome::Succeeded);
        run.settle(outcome)?;

        self.check_health(run, guard).await
    }

    async fn check_health(
        &self,
        run: &mut PipelineRun,
        guard: &RunGuard,
    ) -> std::result::Result<(), StepFailure> {
        run.enter(PipelineState::HealthChecking);
        let policy = HealthPolicy::from_config(&run.settings.healthcheck);
        let report = await_healthy(
            &*self.collaborators.probe,
            &run.settings,
            &policy,
            guard.token(),
        )
        .await;

        let outcome = if report.is_healthy() {
            Ok(StepOutcome::Succeeded)
        } else if report.verdict == HealthVerdict::Cancelled {
            Err(guard.reason().to_string())
        } else {
            Err(report.describe())
        };
        run.settle(outcome)
    }

    /// One rollback attempt after `failure`. Not bound by the run deadline.
    async fn recover(&self, mut run: PipelineRun, failure: StepFailure) -> PipelineResult {
        let c = &self.collaborators;
        run.enter(PipelineState::RollingBack);

        match rollback(&*c.store, &*c.target, &run.settings, &run.version).await {
            Ok(mut outcome) => {
                let mut step_outcome = StepOutcome::Succeeded;
                if run.settings.healthcheck.verify_rollback {
                    let policy = HealthPolicy::for_rollback(&run.settings.healthcheck);
                    let report =
                        await_healthy(&*c.probe, &run.settings, &policy, &self.cancel).await;
                    outcome.verified = Some(report.is_healthy());
                    if !report.is_healthy() {
                        let reason = format!(
                            "restored {} but it is not healthy: {}",
                            outcome.selected,
                            report.describe()
                        );
                        run.diagnostics
                            .warn(Warning::rollback_unverified(reason.clone()));
                        step_outcome = StepOutcome::Degraded(reason);
                    }
                }
                run.log.record(PipelineState::RollingBack, step_outcome);

                let error = (failure.step != PipelineState::RollingBack).then(|| {
                    PipelineError::Step {
                        step: failure.step,
                        reason: failure.reason,
                    }
                });
                run.finish(PipelineState::RolledBack, error, Some(outcome), None)
            }
            Err(cause) => {
                run.log.record(
                    PipelineState::RollingBack,
                    StepOutcome::Failed(cause.to_string()),
                );
                let error = PipelineError::Rollback {
                    step: failure.step,
                    reason: failure.reason,
                    cause,
                };
                run.finish(PipelineState::Failed, Some(error), None, None)
            }
        }
    }
}
