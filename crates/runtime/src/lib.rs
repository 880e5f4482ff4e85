//! Container-runtime integration.
//!
//! [`driver::ContainerRuntime`] is the seam between the lifecycle
//! orchestrator and the container engine: the production implementation
//! ([`docker::DockerCli`]) shells out to the `docker` binary, while
//! [`fake::InMemoryRuntime`] backs integration tests. The crate also
//! houses the manifest store and the readiness prober, which only
//! depend on the driver trait.

pub mod docker;
pub mod driver;
pub mod fake;
pub mod probe;
pub mod store;

pub use driver::{ContainerRuntime, ContainerState, RuntimeError};
pub use probe::{wait_until_ready, ProbeConfig, ProbeError};
pub use store::ManifestStore;
