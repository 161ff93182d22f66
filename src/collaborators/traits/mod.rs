// ABOUTME: Narrow capability traits for the orchestrator's external collaborators.
// ABOUTME: Defines ArtifactStore, DeployTarget, HealthProbe, TestSuite, VersionResolver.

mod artifact;
mod probe;
mod suite;
mod target;
mod version;

pub use artifact::{ArtifactError, ArtifactRecord, ArtifactStore};
pub use probe::{HealthProbe, ProbeError};
pub use suite::{SuiteOutcome, TestError, TestSuite};
pub use target::{DeployTarget, TargetError};
pub use version::VersionResolver;
