// ABOUTME: External command execution for command-backed collaborators.
// ABOUTME: Renders argv templates, injects run context as env vars, enforces timeouts.

use snafu::{ResultExt, Snafu};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::config::{Argv, CommandList, Settings};
use crate::types::Version;

/// Number of stderr lines kept in a failure message.
const STDERR_TAIL_LINES: usize = 20;

/// Failure of a single external command.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CommandError {
    #[snafu(display("failed to start {program}: {source}"))]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("{program} exited with {status}{}", stderr_suffix(stderr)))]
    Exited {
        program: String,
        status: String,
        stderr: String,
    },

    #[snafu(display("{program} did not finish within {timeout:?}"))]
    TimedOut { program: String, timeout: Duration },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Run context exposed to external commands as placeholders and env vars.
#[derive(Debug, Clone)]
pub struct CommandContext {
    values: Vec<(&'static str, String)>,
    env: HashMap<String, String>,
}

impl CommandContext {
    /// Context without a version, used for listing artifacts.
    pub fn new(settings: &Settings) -> Self {
        let repository = settings.artifact(&Version::latest()).repository();
        let values = vec![
            ("repository", repository),
            ("registry", settings.registry.clone()),
            ("namespace", settings.namespace.to_string()),
            ("environment", settings.environment.to_string()),
            ("domain", settings.domain.clone()),
            ("replicas", settings.replicas.to_string()),
        ];

        let mut env = HashMap::new();
        env.insert(
            "ROLLOUT_NAMESPACE".to_string(),
            settings.namespace.to_string(),
        );
        env.insert("ROLLOUT_REGISTRY".to_string(), settings.registry.clone());
        env.insert(
            "ROLLOUT_ENVIRONMENT".to_string(),
            settings.environment.to_string(),
        );
        env.insert("ROLLOUT_DOMAIN".to_string(), settings.domain.clone());
        env.insert(
            "ROLLOUT_REPLICAS".to_string(),
            settings.replicas.to_string(),
        );
        env.insert(
            "COMPOSE_PROJECT_NAME".to_string(),
            settings.compose_project_name(),
        );
        // Read by the compose file to pick the app mode.
        env.insert("FLASK_ENV".to_string(), settings.environment.to_string());

        Self { values, env }
    }

    /// Context for an operation on one version.
    pub fn for_version(settings: &Settings, version: &Version) -> Self {
        let mut context = Self::new(settings);
        let image = settings.artifact(version).to_string();
        context.values.push(("version", version.to_string()));
        context.values.push(("image", image.clone()));
        context
            .env
            .insert("ROLLOUT_VERSION".to_string(), version.to_string());
        context.env.insert("ROLLOUT_IMAGE".to_string(), image);
        // The compose file selects the image tag through this one.
        context
            .env
            .insert("APP_VERSION".to_string(), version.to_string());
        context
    }

    /// Environment variables for the child process.
    pub fn to_env(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Substitute `{placeholder}`s. Unknown braces (e.g. `{{.Tag}}`) pass through.
    pub fn render(&self, arg: &str) -> String {
        self.values
            .iter()
            .fold(arg.to_string(), |acc, (key, value)| {
                acc.replace(&format!("{{{key}}}"), value)
            })
    }
}

/// Runs configured command lists in the project directory.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    project_dir: PathBuf,
    env: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl CommandRunner {
    pub fn new(settings: &Settings) -> Self {
        Self {
            project_dir: settings.project_dir.clone(),
            env: settings.command_env.clone(),
            timeout: settings.commands.timeout,
        }
    }

    /// Run every command in order and return their concatenated stdout.
    ///
    /// Stops at the first failing command.
    pub async fn run(
        &self,
        commands: &CommandList,
        context: &CommandContext,
    ) -> Result<String, CommandError> {
        let mut stdout = String::new();
        for argv in commands.iter() {
            stdout.push_str(&self.run_one(argv, context).await?);
        }
        Ok(stdout)
    }

    async fn run_one(&self, argv: &Argv, context: &CommandContext) -> Result<String, CommandError> {
        let program = context.render(argv.first());
        let args: Vec<String> = argv.tail().iter().map(|a| context.render(a)).collect();

        tracing::debug!("running {} {}", program, args.join(" "));

        let mut command = Command::new(&program);
        command
            .args(&args)
            .current_dir(&self.project_dir)
            .envs(context.to_env())
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, command.output())
                .await
                .map_err(|_| CommandError::TimedOut {
                    program: program.clone(),
                    timeout,
                })?,
            None => command.output().await,
        }
        .context(SpawnSnafu {
            program: program.clone(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(CommandError::Exited {
                program,
                status: output.status.to_string(),
                stderr: tail(&stderr, STDERR_TAIL_LINES),
            });
        }

        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            tracing::debug!(target: "rollout::command", "{}", line);
        }

        Ok(stdout)
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}
