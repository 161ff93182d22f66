// ABOUTME: External collaborators the pipeline drives: artifacts, targets, probes, tests.
// ABOUTME: Traits live in `traits`; the rest are the command, HTTP and git implementations.

pub mod command;
pub mod git;
pub mod http;
pub mod shell;
pub mod traits;

pub use command::{CommandContext, CommandError, CommandRunner};
pub use git::GitDescribe;
pub use http::HttpHealthProbe;
pub use shell::{CommandArtifactStore, CommandDeployTarget, CommandTestSuite, parse_artifact_list};
pub use traits::{
    ArtifactError, ArtifactRecord, ArtifactStore, DeployTarget, HealthProbe, ProbeError,
    SuiteOutcome, TargetError, TestError, TestSuite, VersionResolver,
};
