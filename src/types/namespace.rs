// ABOUTME: Artifact namespace: the repository name artifacts are published under.
// ABOUTME: Kept to a single RFC 1123 label so it doubles as a compose project prefix.

use std::fmt;
use thiserror::Error;

use super::Environment;

/// Longest label DNS and compose project names accept.
const MAX_LEN: usize = 63;

#[derive(Debug, Error)]
pub enum NamespaceError {
    #[error("namespace cannot be empty")]
    Empty,

    #[error("namespace exceeds maximum length of 63 characters")]
    TooLong,

    #[error("namespace cannot start with a hyphen")]
    StartsWithHyphen,

    #[error("namespace cannot end with a hyphen")]
    EndsWithHyphen,

    #[error("namespace must be lowercase")]
    NotLowercase,

    #[error("invalid character in namespace: '{0}'")]
    InvalidChar(char),
}

/// The name artifacts are published under, e.g. `flask-app`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(value: &str) -> Result<Self, NamespaceError> {
        match value.len() {
            0 => return Err(NamespaceError::Empty),
            len if len > MAX_LEN => return Err(NamespaceError::TooLong),
            _ => {}
        }

        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && *c != '-')
        {
            return Err(if c.is_ascii_uppercase() {
                NamespaceError::NotLowercase
            } else {
                NamespaceError::InvalidChar(c)
            });
        }

        if value.starts_with('-') {
            Err(NamespaceError::StartsWithHyphen)
        } else if value.ends_with('-') {
            Err(NamespaceError::EndsWithHyphen)
        } else {
            Ok(Self(value.to_string()))
        }
    }

    /// Derive a namespace from a project directory name.
    ///
    /// `Flask_App` becomes `flask-app`. Runs of other characters collapse to
    /// one hyphen. Returns `None` when nothing usable is left.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        let mut slug = String::with_capacity(name.len());
        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        slug.truncate(MAX_LEN);
        Self::new(slug.trim_end_matches('-')).ok()
    }

    /// Compose project name, so environments on one host do not collide.
    pub fn compose_project(&self, environment: Environment) -> String {
        format!("{}-{}", self.0, environment)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
