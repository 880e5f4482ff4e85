//! Tenant lifecycle orchestration.
//!
//! [`Orchestrator`] is the saga coordinator behind every caller-facing
//! tenant operation: it sequences the plan catalog, credential
//! generation, the transactional subnet allocator, the manifest store,
//! the container runtime, and the readiness prober, and owns the
//! partial-failure policy between the metadata store and the engine.

pub mod error;
pub mod lifecycle;
pub mod views;

pub use error::OrchestratorError;
pub use lifecycle::{Orchestrator, OrchestratorConfig};
