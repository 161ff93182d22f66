// ABOUTME: Deployable version identifier with artifact-tag validation.
// ABOUTME: Falls back to the "latest" sentinel when no version can be derived.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sentinel used when a version cannot be derived from source control.
pub const LATEST: &str = "latest";

const MAX_LEN: usize = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("version cannot be empty")]
    Empty,

    #[error("version exceeds maximum length of 128 characters")]
    TooLong,

    #[error("version cannot start with '{0}'")]
    InvalidStart(char),

    #[error("invalid character in version: '{0}'")]
    InvalidChar(char),
}

/// An opaque version identifier, ordered by recency only by the store that reports it.
///
/// The accepted character set is the one an artifact tag can carry, so a
/// `Version` can always be appended to a repository as `repo:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    pub fn new(value: &str) -> Result<Self, VersionError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(VersionError::Empty);
        }

        if value.len() > MAX_LEN {
            return Err(VersionError::TooLong);
        }

        if let Some(first @ ('.' | '-')) = value.chars().next() {
            return Err(VersionError::InvalidStart(first));
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '.' && c != '_' && c != '-' {
                return Err(VersionError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    /// The fallback version used when resolution is impossible.
    pub fn latest() -> Self {
        Self(LATEST.to_string())
    }

    pub fn is_latest(&self) -> bool {
        self.0 == LATEST
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::new(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Version::new(&value).map_err(serde::de::Error::custom)
    }
}
