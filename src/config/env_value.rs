// ABOUTME: Configuration values that may come from the process environment.
// ABOUTME: A value is either literal or `{ env: VAR, default: ... }`, resolved once per run.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    /// Resolve against the current environment.
    ///
    /// A variable that is set but empty counts as unset, so CI systems that
    /// export blank values still get the default.
    pub fn resolve(&self) -> Result<String> {
        let (var, default) = match self {
            EnvValue::Literal(value) => return Ok(value.clone()),
            EnvValue::FromEnv { var, default } => (var, default),
        };

        match std::env::var(var) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => default
                .clone()
                .ok_or_else(|| Error::MissingEnvVar(var.clone())),
        }
    }
}

impl From<&str> for EnvValue {
    fn from(value: &str) -> Self {
        EnvValue::Literal(value.to_string())
    }
}

/// Resolve every value of a `commands.env` style map.
pub fn resolve_env_map(map: &HashMap<String, EnvValue>) -> Result<HashMap<String, String>> {
    let mut resolved = HashMap::with_capacity(map.len());
    for (name, value) in map {
        resolved.insert(name.clone(), value.resolve()?);
    }
    Ok(resolved)
}
