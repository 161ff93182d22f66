// ABOUTME: Artifact retention configuration.
// ABOUTME: Defines how many published versions survive a cleanup pass.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetentionConfig {
    #[serde(default = "default_keep")]
    pub keep: usize,
}

fn default_keep() -> usize {
    5
}

impl Default for RetentionConfig {
    fn default() -> Self {
        RetentionConfig {
            keep: default_keep(),
        }
    }
}
