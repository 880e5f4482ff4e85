//! Docker CLI driver.
//!
//! Shells out to the `docker` binary for every operation, mirroring how
//! an operator would drive the same stack by hand. Output parsing is
//! kept in free functions so it can be unit-tested without a daemon.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::driver::{ContainerRuntime, ContainerState, RuntimeError};

/// Port the workflow engine serves its health endpoint on, inside the
/// tenant network.
const ENGINE_HEALTH_URL: &str = "http://localhost:8080/healthz";

/// Container engine driver backed by the `docker` CLI.
#[derive(Debug, Clone, Default)]
pub struct DockerCli;

impl DockerCli {
    pub fn new() -> Self {
        Self
    }

    /// Run `docker` with the given args and return trimmed stdout.
    async fn run(&self, args: &[&str]) -> Result<String, RuntimeError> {
        let output = Command::new("docker").args(args).output().await?;

        if !output.status.success() {
            return Err(RuntimeError::ExecutionFailed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn create_network(&self, name: &str, subnet: &str) -> Result<(), RuntimeError> {
        let subnet_arg = format!("--subnet={subnet}");
        match self
            .run(&["network", "create", name, &subnet_arg, "--internal"])
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_already_exists(&e) => {
                tracing::debug!(network = name, "Network already exists, continuing");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn remove_network(&self, name: &str) -> Result<(), RuntimeError> {
        match self.run(&["network", "rm", name]).await {
            Ok(_) => Ok(()),
            Err(e) if is_not_found(&e) => {
                tracing::debug!(network = name, "Network already absent, continuing");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn compose_up(&self, manifest: &Path) -> Result<(), RuntimeError> {
        let manifest = manifest.to_string_lossy();
        self.run(&["compose", "-f", &manifest, "up", "-d"]).await?;
        Ok(())
    }

    async fn compose_down(&self, manifest: &Path) -> Result<(), RuntimeError> {
        let manifest_arg = manifest.to_string_lossy();
        match self
            .run(&["compose", "-f", &manifest_arg, "down", "-v"])
            .await
        {
            Ok(_) => Ok(()),
            // A missing manifest means the stack never came up (or was
            // already torn down); treat as done.
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn find_container(&self, name_selector: &str) -> Result<Option<String>, RuntimeError> {
        let filter = format!("name={name_selector}");
        let stdout = self.run(&["ps", "-q", "-f", &filter]).await?;
        Ok(first_container_id(&stdout))
    }

    async fn inspect_state(&self, container: &str) -> Result<ContainerState, RuntimeError> {
        match self
            .run(&[
                "inspect",
                "--format",
                "{{.State.Status}}",
                container,
            ])
            .await
        {
            Ok(stdout) => Ok(parse_container_state(&stdout)),
            // Inspect on an unknown id is a lookup miss, not a failure.
            Err(RuntimeError::ExecutionFailed { .. }) => Ok(ContainerState::NotFound),
            Err(e) => Err(e),
        }
    }

    async fn health_check(&self, container: &str) -> Result<(), RuntimeError> {
        self.run(&[
            "exec",
            container,
            "wget",
            "--no-verbose",
            "--tries=1",
            "--spider",
            ENGINE_HEALTH_URL,
        ])
        .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output classification helpers
// ---------------------------------------------------------------------------

/// Whether a failed command stderr indicates the resource already exists.
fn is_already_exists(err: &RuntimeError) -> bool {
    matches!(err, RuntimeError::ExecutionFailed { stderr, .. }
        if stderr.to_lowercase().contains("already exists"))
}

/// Whether a failed command stderr indicates the resource is absent.
fn is_not_found(err: &RuntimeError) -> bool {
    matches!(err, RuntimeError::ExecutionFailed { stderr, .. }
        if {
            let s = stderr.to_lowercase();
            s.contains("no such") || s.contains("not found")
        })
}

/// Parse `docker inspect --format {{.State.Status}}` output.
fn parse_container_state(stdout: &str) -> ContainerState {
    match stdout.trim() {
        "running" => ContainerState::Running,
        "exited" => ContainerState::Exited,
        "" => ContainerState::NotFound,
        other => ContainerState::Other(other.to_string()),
    }
}

/// First id from `docker ps -q` output (one id per line).
fn first_container_id(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(String::from)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn exec_failed(stderr: &str) -> RuntimeError {
        RuntimeError::ExecutionFailed {
            exit_code: Some(1),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn already_exists_is_benign() {
        assert!(is_already_exists(&exec_failed(
            "Error response from daemon: network with name tenant_x already exists"
        )));
        assert!(!is_already_exists(&exec_failed("permission denied")));
    }

    #[test]
    fn not_found_is_benign_for_teardown() {
        assert!(is_not_found(&exec_failed(
            "Error response from daemon: network tenant_x not found"
        )));
        assert!(is_not_found(&exec_failed(
            "Error: No such network: tenant_x"
        )));
        assert!(!is_not_found(&exec_failed("daemon unreachable")));
    }

    #[test]
    fn container_state_parsing() {
        assert_eq!(parse_container_state("running\n"), ContainerState::Running);
        assert_eq!(parse_container_state("exited"), ContainerState::Exited);
        assert_eq!(parse_container_state(""), ContainerState::NotFound);
        assert_eq!(
            parse_container_state("restarting"),
            ContainerState::Other("restarting".to_string())
        );
    }

    #[test]
    fn first_id_from_ps_output() {
        assert_eq!(first_container_id(""), None);
        assert_eq!(
            first_container_id("abc123\n"),
            Some("abc123".to_string())
        );
        assert_eq!(
            first_container_id("abc123\ndef456\n"),
            Some("abc123".to_string())
        );
    }
}
