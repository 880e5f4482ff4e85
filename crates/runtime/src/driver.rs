//! The container-runtime driver contract.

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;

/// Errors from container-engine operations.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The engine binary could not be spawned at all.
    #[error("container engine binary not found: {0}")]
    Spawn(#[from] std::io::Error),

    /// The engine ran but reported failure.
    #[error("container engine command failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },
}

/// Run state of a single container as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerState {
    Running,
    Exited,
    /// The engine has no record of the container (removed out-of-band,
    /// or the identifier was never set).
    NotFound,
    /// Any other engine-reported state (`created`, `restarting`, ...).
    Other(String),
}

impl ContainerState {
    /// The wire/string form used in status views.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Exited => "exited",
            Self::NotFound => "not_found",
            Self::Other(s) => s,
        }
    }
}

/// Abstraction over the container engine's tenant-facing operations.
///
/// The orchestrator's saga logic only ever talks to this trait, so the
/// invocation mechanism (CLI, API socket, in-memory fake) is swappable.
/// Network and stack operations are idempotent: "already exists" and
/// "already absent" outcomes are successes, because retries after a
/// partial failure are expected.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Create an isolated, internal network with the given subnet.
    /// Succeeds if the network already exists.
    async fn create_network(&self, name: &str, subnet: &str) -> Result<(), RuntimeError>;

    /// Remove a network. Succeeds if the network is already absent.
    async fn remove_network(&self, name: &str) -> Result<(), RuntimeError>;

    /// Start the stack described by a rendered manifest.
    async fn compose_up(&self, manifest: &Path) -> Result<(), RuntimeError>;

    /// Stop the stack described by a rendered manifest and remove its
    /// volumes. Succeeds if the stack is already gone.
    async fn compose_down(&self, manifest: &Path) -> Result<(), RuntimeError>;

    /// Find a running container whose name matches the selector.
    /// Returns `None` when nothing matches; the runtime may still be
    /// initializing, so an empty result is not an error.
    async fn find_container(&self, name_selector: &str) -> Result<Option<String>, RuntimeError>;

    /// Inspect a container's run state. An unknown identifier yields
    /// [`ContainerState::NotFound`], not an error.
    async fn inspect_state(&self, container: &str) -> Result<ContainerState, RuntimeError>;

    /// Probe the service's internal health endpoint from inside the
    /// container. `Ok` means the service answered.
    async fn health_check(&self, container: &str) -> Result<(), RuntimeError>;
}
