// ABOUTME: Integration tests for the command, HTTP and git collaborators.
// ABOUTME: Runs real `sh` commands in temp dirs and probes a local TCP listener.

use rollout::collaborators::*;
use rollout::config::{Config, Settings};
use rollout::types::{Environment, Version};
use std::fs;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn settings_in(dir: &Path, yaml: &str) -> Settings {
    fs::write(dir.join("rollout.yml"), yaml).unwrap();
    Config::discover(dir)
        .unwrap()
        .for_environment(Environment::Staging)
        .unwrap()
}

fn v(tag: &str) -> Version {
    Version::new(tag).unwrap()
}

mod shell_store {
    use super::*;

    const YAML: &str = r#"
namespace: shop
registry: registry.example.com
commands:
  build: [sh, -c, "echo built {image} > build.txt"]
  publish: [sh, -c, "echo oops >&2; exit 3"]
  list:
    - [sh, -c, "echo TAG"]
    - [sh, -c, "printf 'v3\nv2\n<none>\nv1\n'"]
  remove: [sh, -c, "echo {version} >> removed.txt"]
  prune: [sh, -c, "touch pruned"]
"#;

    #[tokio::test]
    async fn build_renders_placeholders_in_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path(), YAML);

        CommandArtifactStore.build(&settings, &v("v3")).await.unwrap();

        let output = fs::read_to_string(dir.path().join("build.txt")).unwrap();
        assert_eq!(output.trim(), "built registry.example.com/shop:v3");
    }

    #[tokio::test]
    async fn failing_command_reports_exit_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path(), YAML);

        let err = CommandArtifactStore
            .publish(&settings, &v("v3"))
            .await
            .unwrap_err();

        assert!(matches!(err, ArtifactError::PublishFailed(_)));
        let message = err.to_string();
        assert!(message.contains("oops"), "{message}");
        assert!(message.contains("sh exited"), "{message}");
    }

    #[tokio::test]
    async fn list_concatenates_command_output() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path(), YAML);

        let records = CommandArtifactStore.list(&settings).await.unwrap();
        let tags: Vec<&str> = records.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(tags, ["v3", "v2", "v1"]);
    }

    #[tokio::test]
    async fn remove_and_prune_run_their_commands() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path(), YAML);

        CommandArtifactStore.prune(&settings).await.unwrap();
        CommandArtifactStore.remove(&settings, &v("v1")).await.unwrap();

        assert!(dir.path().join("pruned").exists());
        let removed = fs::read_to_string(dir.path().join("removed.txt")).unwrap();
        assert_eq!(removed.trim(), "v1");
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(
            dir.path(),
            "namespace: shop\ncommands:\n  build: [definitely-not-a-real-program-xyz]\n",
        );

        let err = CommandArtifactStore
            .build(&settings, &v("v1"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to start"), "{err}");
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(
            dir.path(),
            "namespace: shop\ncommands:\n  build: [sleep, \"5\"]\n  timeout: 100ms\n",
        );

        let err = CommandArtifactStore
            .build(&settings, &v("v1"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("did not finish"), "{err}");
    }
}

mod shell_target {
    use super::*;

    const YAML: &str = r#"
namespace: shop
registry: registry.example.com
commands:
  deploy: [sh, -c, "echo \"deploy $APP_VERSION $ROLLOUT_VERSION $COMPOSE_PROJECT_NAME $FLASK_ENV\" >> target.txt"]
"#;

    #[tokio::test]
    async fn deploy_exports_run_context() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path(), YAML);

        CommandDeployTarget.deploy(&settings, &v("v7")).await.unwrap();

        let output = fs::read_to_string(dir.path().join("target.txt")).unwrap();
        assert_eq!(output.trim(), "deploy v7 v7 shop-staging staging");
    }

    #[tokio::test]
    async fn configured_env_overrides_run_context() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = format!("{YAML}  env:\n    FLASK_ENV: debug\n");
        let settings = settings_in(dir.path(), &yaml);

        CommandDeployTarget.deploy(&settings, &v("v7")).await.unwrap();

        let output = fs::read_to_string(dir.path().join("target.txt")).unwrap();
        assert_eq!(output.trim(), "deploy v7 v7 shop-staging debug");
    }

    #[tokio::test]
    async fn redeploy_falls_back_to_deploy_command() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path(), &format!("{YAML}  rollback: null\n"));

        CommandDeployTarget.redeploy(&settings, &v("v6")).await.unwrap();

        let output = fs::read_to_string(dir.path().join("target.txt")).unwrap();
        assert_eq!(output.trim(), "deploy v6 v6 shop-staging staging");
    }

    #[tokio::test]
    async fn redeploy_prefers_rollback_command() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = format!(
            "{YAML}  rollback: [sh, -c, \"echo rollback {{version}} > target.txt\"]\n"
        );
        let settings = settings_in(dir.path(), &yaml);

        CommandDeployTarget.redeploy(&settings, &v("v6")).await.unwrap();

        let output = fs::read_to_string(dir.path().join("target.txt")).unwrap();
        assert_eq!(output.trim(), "rollback v6");
    }
}

mod shell_suite {
    use super::*;

    #[tokio::test]
    async fn no_test_command_is_not_configured() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path(), "namespace: shop\n");

        let outcome = CommandTestSuite.run(&settings, &v("v1")).await.unwrap();
        assert_eq!(outcome, SuiteOutcome::NotConfigured);
    }

    #[tokio::test]
    async fn passing_and_failing_suites() {
        let dir = tempfile::tempdir().unwrap();
        let passing = settings_in(dir.path(), "namespace: shop\ncommands:\n  test: [\"true\"]\n");
        assert_eq!(
            CommandTestSuite.run(&passing, &v("v1")).await.unwrap(),
            SuiteOutcome::Passed
        );

        let failing = settings_in(dir.path(), "namespace: shop\ncommands:\n  test: [\"false\"]\n");
        let err = CommandTestSuite.run(&failing, &v("v1")).await.unwrap_err();
        assert!(matches!(err, TestError::Failed(_)));
    }
}

mod http_probe {
    use super::*;

    /// Serve one canned response per connection.
    async fn serve(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let response = format!("HTTP/1.1 {status_line}\r\nContent-Length: 0\r\n\r\n");
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{addr}/health")
    }

    fn settings_for(url: String) -> Settings {
        let mut settings = Config::from_yaml("namespace: shop\n")
            .unwrap()
            .for_environment(Environment::Development)
            .unwrap();
        settings.healthcheck.url = url;
        settings
    }

    #[tokio::test]
    async fn success_status_is_healthy() {
        let settings = settings_for(serve("200 OK").await);
        assert!(HttpHealthProbe.probe(&settings).await.unwrap());
    }

    #[tokio::test]
    async fn error_status_is_unhealthy() {
        let settings = settings_for(serve("503 Service Unavailable").await);
        assert!(!HttpHealthProbe.probe(&settings).await.unwrap());
    }

    #[tokio::test]
    async fn refused_connection_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let settings = settings_for(format!("http://{addr}/health"));
        let err = HttpHealthProbe.probe(&settings).await.unwrap_err();
        assert!(matches!(err, ProbeError::Connection(_)), "{err}");
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let mut settings = settings_for(format!("http://{addr}/health"));
        settings.healthcheck.timeout = Some(std::time::Duration::from_millis(200));
        let err = HttpHealthProbe.probe(&settings).await.unwrap_err();
        assert!(matches!(err, ProbeError::Timeout(_)), "{err}");
    }
}

mod git {
    use super::*;

    #[tokio::test]
    async fn describes_tagged_commit() {
        let dir = tempfile::tempdir().unwrap();
        let git = |args: &[&str]| {
            std::process::Command::new("git")
                .args(args)
                .current_dir(dir.path())
                .env("GIT_AUTHOR_NAME", "test")
                .env("GIT_AUTHOR_EMAIL", "test@example.com")
                .env("GIT_COMMITTER_NAME", "test")
                .env("GIT_COMMITTER_EMAIL", "test@example.com")
                .output()
        };
        if git(&["init", "-q"]).is_err() {
            // git not installed
            return;
        }
        git(&["commit", "-q", "--allow-empty", "-m", "initial"]).unwrap();
        git(&["tag", "v1.0.0"]).unwrap();

        let version = GitDescribe::new(dir.path()).resolve().await;
        assert_eq!(version, v("v1.0.0"));
    }

    #[tokio::test]
    async fn falls_back_to_latest_without_history() {
        let dir = tempfile::tempdir().unwrap();
        let version = GitDescribe::new(dir.path()).resolve().await;
        assert!(version.is_latest());
    }
}
