// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Writes a rollout.yml template mirroring the docker/compose defaults.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Namespace;

use super::{CONFIG_FILENAME, Config};

pub fn init_config(dir: &Path, namespace: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();

    match namespace {
        Some(ns) => config.namespace = Namespace::new(ns)?,
        None => {
            let derived = dir
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(Namespace::from_dir_name);
            if let Some(ns) = derived {
                config.namespace = ns;
            }
        }
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    let healthcheck = &config.healthcheck;
    format!(
        r#"namespace: {namespace}
# Use `local` to skip publishing, or read it from the environment:
# registry: {{ env: REGISTRY, default: local }}
registry: local
healthcheck:
  url: {url}
  max_attempts: {attempts}
  interval: {interval}s
retention:
  keep: {keep}
commands:
  # test: [python, -m, pytest, tests/]
  build: [docker, build, -t, "{{image}}", -f, app/Dockerfile, app/]
  publish: [docker, push, "{{image}}"]
  deploy:
    - [docker-compose, -f, deployment/docker-compose.yml, pull]
    - [docker-compose, -f, deployment/docker-compose.yml, up, -d, --remove-orphans]
  rollback: [docker-compose, -f, deployment/docker-compose.yml, up, -d]
environments:
  production:
    replicas: 3
  staging:
    replicas: 1
"#,
        namespace = config.namespace,
        url = healthcheck.url,
        attempts = healthcheck.max_attempts,
        interval = healthcheck.interval.as_secs(),
        keep = config.retention.keep,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Environment;

    #[test]
    fn template_yaml_parses_back() {
        let yaml = generate_template_yaml(&Config::template());
        let config = Config::from_yaml(&yaml).unwrap();

        assert_eq!(config.namespace.as_str(), "my-app");
        let settings = config.for_environment(Environment::Production).unwrap();
        assert_eq!(settings.replicas, 3);
        assert_eq!(settings.retention.keep, 5);
        assert!(settings.commands.test.is_none());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), Some("shop"), false).unwrap();

        let err = init_config(dir.path(), None, false).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));

        init_config(dir.path(), Some("shop-api"), true).unwrap();
        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.namespace.as_str(), "shop-api");
    }

    #[test]
    fn namespace_defaults_to_directory_name() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("Flask_App");
        std::fs::create_dir(&dir).unwrap();

        init_config(&dir, None, false).unwrap();

        let config = Config::discover(&dir).unwrap();
        assert_eq!(config.namespace.as_str(), "flask-app");
    }
}
