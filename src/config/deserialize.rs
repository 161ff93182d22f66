// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Handles namespaces and external command lists.

use nonempty::NonEmpty;
use serde::Deserialize;

use super::commands::{Argv, CommandList};
use crate::types::Namespace;

pub fn deserialize_namespace<'de, D>(deserializer: D) -> Result<Namespace, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Namespace::new(&s).map_err(serde::de::Error::custom)
}

pub fn deserialize_command_list<'de, D>(deserializer: D) -> Result<CommandList, D::Error>
where
    D: serde::Deserializer<'de>,
{
    CommandEntry::deserialize(deserializer)?
        .into_command_list()
        .map_err(serde::de::Error::custom)
}

pub fn deserialize_command_list_option<'de, D>(
    deserializer: D,
) -> Result<Option<CommandList>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<CommandEntry> = Option::deserialize(deserializer)?;
    opt.map(CommandEntry::into_command_list)
        .transpose()
        .map_err(serde::de::Error::custom)
}

/// A single argv (`[docker, push, "{image}"]`) or a sequence of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CommandEntry {
    Single(Vec<String>),
    Sequence(Vec<Vec<String>>),
}

impl CommandEntry {
    fn into_command_list(self) -> Result<CommandList, String> {
        let argvs = match self {
            CommandEntry::Single(argv) => vec![into_argv(argv)?],
            CommandEntry::Sequence(argvs) => argvs
                .into_iter()
                .map(into_argv)
                .collect::<Result<Vec<_>, _>>()?,
        };

        NonEmpty::from_vec(argvs)
            .map(CommandList::new)
            .ok_or_else(|| "command list cannot be empty".to_string())
    }
}

fn into_argv(argv: Vec<String>) -> Result<Argv, String> {
    if argv.first().is_some_and(|program| program.trim().is_empty()) {
        return Err("command program cannot be blank".to_string());
    }
    NonEmpty::from_vec(argv).ok_or_else(|| "command cannot be empty".to_string())
}
