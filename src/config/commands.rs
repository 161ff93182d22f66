// ABOUTME: External command templates for the artifact store and deploy target.
// ABOUTME: Defaults mirror a docker / docker-compose workflow.

use nonempty::{NonEmpty, nonempty};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::EnvValue;
use super::deserialize::{deserialize_command_list, deserialize_command_list_option};

/// Program followed by its arguments. Arguments may contain `{placeholder}`s.
pub type Argv = NonEmpty<String>;

/// One or more commands run in sequence; the first failure stops the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandList(NonEmpty<Argv>);

impl CommandList {
    pub fn new(argvs: NonEmpty<Argv>) -> Self {
        Self(argvs)
    }

    /// Build a single-command list from string slices.
    pub fn single(program: &str, args: &[&str]) -> Self {
        let mut argv = NonEmpty::new(program.to_string());
        argv.extend(args.iter().map(|a| a.to_string()));
        Self(NonEmpty::new(argv))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argv> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandsConfig {
    /// Test suite run before building. Testing is skipped when unset.
    #[serde(default, deserialize_with = "deserialize_command_list_option")]
    pub test: Option<CommandList>,

    #[serde(default = "default_build", deserialize_with = "deserialize_command_list")]
    pub build: CommandList,

    #[serde(default = "default_publish", deserialize_with = "deserialize_command_list")]
    pub publish: CommandList,

    #[serde(default = "default_deploy", deserialize_with = "deserialize_command_list")]
    pub deploy: CommandList,

    /// Used to redeploy a prior version. Falls back to `deploy` when set to `null`.
    #[serde(default = "default_rollback", deserialize_with = "deserialize_command_list_option")]
    pub rollback: Option<CommandList>,

    /// Prints one known version per line, most recent first.
    #[serde(default = "default_list", deserialize_with = "deserialize_command_list")]
    pub list: CommandList,

    #[serde(default = "default_remove", deserialize_with = "deserialize_command_list")]
    pub remove: CommandList,

    /// Best-effort housekeeping run before retention removals. `null` disables it.
    #[serde(default = "default_prune", deserialize_with = "deserialize_command_list_option")]
    pub prune: Option<CommandList>,

    /// Upper bound for any single external command.
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Extra environment passed to every external command.
    #[serde(default)]
    pub env: HashMap<String, EnvValue>,
}

impl CommandsConfig {
    /// The command list used to redeploy a prior version.
    pub fn rollback_or_deploy(&self) -> &CommandList {
        self.rollback.as_ref().unwrap_or(&self.deploy)
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        CommandsConfig {
            test: None,
            build: default_build(),
            publish: default_publish(),
            deploy: default_deploy(),
            rollback: default_rollback(),
            list: default_list(),
            remove: default_remove(),
            prune: default_prune(),
            timeout: None,
            env: HashMap::new(),
        }
    }
}

const COMPOSE_FILE: &str = "deployment/docker-compose.yml";

fn default_build() -> CommandList {
    CommandList::single(
        "docker",
        &["build", "-t", "{image}", "-f", "app/Dockerfile", "app/"],
    )
}

fn default_publish() -> CommandList {
    CommandList::single("docker", &["push", "{image}"])
}

fn default_deploy() -> CommandList {
    let compose = |args: &[&str]| {
        let mut argv = nonempty!["docker-compose".to_string(), "-f".to_string()];
        argv.push(COMPOSE_FILE.to_string());
        argv.extend(args.iter().map(|a| a.to_string()));
        argv
    };
    CommandList::new(nonempty![
        compose(&["pull"]),
        compose(&["up", "-d", "--remove-orphans"])
    ])
}

fn default_rollback() -> Option<CommandList> {
    Some(CommandList::single(
        "docker-compose",
        &["-f", COMPOSE_FILE, "up", "-d"],
    ))
}

fn default_prune() -> Option<CommandList> {
    Some(CommandList::single("docker", &["image", "prune", "-f"]))
}

fn default_list() -> CommandList {
    CommandList::single(
        "docker",
        &[
            "images",
            "--format",
            "{{.Tag}}\t{{.CreatedAt}}",
            "{repository}",
        ],
    )
}

fn default_remove() -> CommandList {
    CommandList::single("docker", &["rmi", "{image}"])
}
