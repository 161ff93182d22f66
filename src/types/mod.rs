// ABOUTME: Validated domain types shared by configuration and the pipeline.
// ABOUTME: Versions, environments, namespaces and artifact references.

mod artifact_ref;
mod environment;
mod namespace;
mod version;

pub use artifact_ref::{ArtifactRef, LOCAL_REGISTRY};
pub use environment::{Environment, ParseEnvironmentError};
pub use namespace::{Namespace, NamespaceError};
pub use version::{LATEST, Version, VersionError};
