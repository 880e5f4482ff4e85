//! In-memory container runtime for tests.
//!
//! Models just enough engine behavior for the orchestrator's saga
//! logic: networks are a set, `compose up` registers the three stack
//! containers derived from the manifest file name, and individual
//! operations can be scripted to fail. All state lives behind a mutex
//! so the fake is shareable across tasks like the real driver.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::driver::{ContainerRuntime, ContainerState, RuntimeError};

#[derive(Debug, Clone)]
struct ContainerEntry {
    id: String,
    state: ContainerState,
    healthy: bool,
    /// Health checks pass from this (1-based) call count on; overrides
    /// `healthy` when set.
    healthy_after: Option<u32>,
    health_checks: u32,
}

#[derive(Debug, Default)]
struct Inner {
    networks: HashMap<String, String>,
    containers: HashMap<String, ContainerEntry>,
    removed_networks: Vec<String>,
    downed_manifests: Vec<PathBuf>,
    fail_create_network: Option<String>,
    fail_compose_up: Option<String>,
    fail_compose_down: Option<String>,
    fail_remove_network: Option<String>,
    suppress_containers: bool,
    unhealthy_stacks: bool,
}

/// Scriptable in-memory [`ContainerRuntime`].
#[derive(Debug, Default)]
pub struct InMemoryRuntime {
    inner: Mutex<Inner>,
}

impl InMemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    // -- scripting ----------------------------------------------------------

    /// Register a container by name with the given state. Healthy by
    /// default.
    pub fn register_container(&self, name: &str, state: ContainerState) {
        self.inner().containers.insert(
            name.to_string(),
            ContainerEntry {
                id: format!("id-{name}"),
                state,
                healthy: true,
                healthy_after: None,
                health_checks: 0,
            },
        );
    }

    /// Force a container's health check to pass or fail.
    pub fn set_healthy(&self, name: &str, healthy: bool) {
        if let Some(entry) = self.inner().containers.get_mut(name) {
            entry.healthy = healthy;
            entry.healthy_after = None;
        }
    }

    /// Health checks on this container pass from the `n`-th call on.
    pub fn set_healthy_after(&self, name: &str, n: u32) {
        if let Some(entry) = self.inner().containers.get_mut(name) {
            entry.healthy_after = Some(n);
        }
    }

    /// Make `compose_up` stop registering containers, simulating an
    /// engine that is still initializing when ids are queried.
    pub fn suppress_container_registration(&self) {
        self.inner().suppress_containers = true;
    }

    /// Containers registered by future `compose_up` calls start with a
    /// failing health endpoint.
    pub fn register_unhealthy_stacks(&self) {
        self.inner().unhealthy_stacks = true;
    }

    pub fn fail_create_network(&self, stderr: &str) {
        self.inner().fail_create_network = Some(stderr.to_string());
    }

    pub fn fail_compose_up(&self, stderr: &str) {
        self.inner().fail_compose_up = Some(stderr.to_string());
    }

    pub fn fail_compose_down(&self, stderr: &str) {
        self.inner().fail_compose_down = Some(stderr.to_string());
    }

    pub fn fail_remove_network(&self, stderr: &str) {
        self.inner().fail_remove_network = Some(stderr.to_string());
    }

    // -- assertions ---------------------------------------------------------

    pub fn network_exists(&self, name: &str) -> bool {
        self.inner().networks.contains_key(name)
    }

    pub fn removed_networks(&self) -> Vec<String> {
        self.inner().removed_networks.clone()
    }

    pub fn downed_manifests(&self) -> Vec<PathBuf> {
        self.inner().downed_manifests.clone()
    }

    pub fn health_check_count(&self, name: &str) -> u32 {
        self.inner()
            .containers
            .get(name)
            .map(|e| e.health_checks)
            .unwrap_or(0)
    }

    // -- internals ----------------------------------------------------------

    fn entry_mut<'a>(
        inner: &'a mut Inner,
        selector: &str,
    ) -> Option<&'a mut ContainerEntry> {
        // Containers are addressable by name or by the id we handed out.
        if inner.containers.contains_key(selector) {
            return inner.containers.get_mut(selector);
        }
        inner
            .containers
            .values_mut()
            .find(|e| e.id == selector)
    }

    fn scripted_failure(slot: &Option<String>) -> Result<(), RuntimeError> {
        match slot {
            Some(stderr) => Err(RuntimeError::ExecutionFailed {
                exit_code: Some(1),
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContainerRuntime for InMemoryRuntime {
    async fn create_network(&self, name: &str, subnet: &str) -> Result<(), RuntimeError> {
        let mut inner = self.inner();
        Self::scripted_failure(&inner.fail_create_network)?;
        // Second create of the same network is idempotent, as with the
        // real driver.
        inner
            .networks
            .entry(name.to_string())
            .or_insert_with(|| subnet.to_string());
        Ok(())
    }

    async fn remove_network(&self, name: &str) -> Result<(), RuntimeError> {
        let mut inner = self.inner();
        Self::scripted_failure(&inner.fail_remove_network)?;
        inner.networks.remove(name);
        inner.removed_networks.push(name.to_string());
        Ok(())
    }

    async fn compose_up(&self, manifest: &Path) -> Result<(), RuntimeError> {
        let mut inner = self.inner();
        Self::scripted_failure(&inner.fail_compose_up)?;

        if inner.suppress_containers {
            return Ok(());
        }

        // Manifest files are named `tenant-<id>.yml`; the stack's three
        // containers take `<service>-<stem>` names.
        let stem = manifest
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let healthy = !inner.unhealthy_stacks;
        for service in ["engine", "postgres", "redis"] {
            let name = format!("{service}-{stem}");
            inner.containers.entry(name.clone()).or_insert(ContainerEntry {
                id: format!("id-{name}"),
                state: ContainerState::Running,
                healthy,
                healthy_after: None,
                health_checks: 0,
            });
        }
        Ok(())
    }

    async fn compose_down(&self, manifest: &Path) -> Result<(), RuntimeError> {
        let mut inner = self.inner();
        Self::scripted_failure(&inner.fail_compose_down)?;

        let stem = manifest
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        inner
            .containers
            .retain(|name, _| !name.ends_with(stem.as_str()));
        inner.downed_manifests.push(manifest.to_path_buf());
        Ok(())
    }

    async fn find_container(&self, name_selector: &str) -> Result<Option<String>, RuntimeError> {
        let inner = self.inner();
        Ok(inner
            .containers
            .get(name_selector)
            .map(|e| e.id.clone()))
    }

    async fn inspect_state(&self, container: &str) -> Result<ContainerState, RuntimeError> {
        let mut inner = self.inner();
        Ok(Self::entry_mut(&mut inner, container)
            .map(|e| e.state.clone())
            .unwrap_or(ContainerState::NotFound))
    }

    async fn health_check(&self, container: &str) -> Result<(), RuntimeError> {
        let mut inner = self.inner();
        let Some(entry) = Self::entry_mut(&mut inner, container) else {
            return Err(RuntimeError::ExecutionFailed {
                exit_code: Some(1),
                stderr: format!("No such container: {container}"),
            });
        };

        entry.health_checks += 1;
        let passing = match entry.healthy_after {
            Some(n) => entry.health_checks >= n,
            None => entry.healthy,
        };

        if passing {
            Ok(())
        } else {
            Err(RuntimeError::ExecutionFailed {
                exit_code: Some(1),
                stderr: "health endpoint not answering".to_string(),
            })
        }
    }
}
