// ABOUTME: Library root for rollout - exposes the pipeline and its collaborators.
// ABOUTME: The main binary is in main.rs.

pub mod collaborators;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;
