use std::sync::Arc;

use workhive_orchestrator::Orchestrator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: workhive_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The tenant lifecycle orchestrator.
    pub orchestrator: Arc<Orchestrator>,
}
