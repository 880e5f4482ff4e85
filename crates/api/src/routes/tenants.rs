//! Route definitions for the `/tenants` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::tenants;
use crate::state::AppState;

/// Routes mounted at `/tenants`.
///
/// ```text
/// GET    /             -> list
/// POST   /             -> create
/// GET    /{id}/status  -> get_status
/// DELETE /{id}         -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tenants::list).post(tenants::create))
        .route("/{id}", axum::routing::delete(tenants::delete))
        .route("/{id}/status", get(tenants::get_status))
}
