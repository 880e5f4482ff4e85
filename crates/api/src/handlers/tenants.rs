//! Handlers for the `/tenants` resource.
//!
//! Thin delegation to the lifecycle orchestrator; the caller is assumed
//! to be authorized by the time a request reaches this layer.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use workhive_core::types::TenantId;
use workhive_db::models::tenant::TenantFilter;
use workhive_orchestrator::views::{TenantStatusView, TenantSummaryView, TenantView};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for tenant creation.
#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    /// Defaults to `starter` when omitted.
    pub plan: Option<String>,
}

/// POST /api/v1/tenants
///
/// Long-running: blocks on stack start and the readiness probe. The
/// request timeout layer above this handler cancels the probe early
/// via the token; metadata committed by then stays committed.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateTenantRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TenantView>>)> {
    let plan = input.plan.as_deref().unwrap_or("starter");
    let cancel = CancellationToken::new();

    let view = state
        .orchestrator
        .create_tenant(&input.name, plan, &cancel)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// GET /api/v1/tenants
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<TenantFilter>,
) -> AppResult<Json<DataResponse<Vec<TenantSummaryView>>>> {
    let tenants = state.orchestrator.list_tenants(&filter).await?;
    Ok(Json(DataResponse { data: tenants }))
}

/// GET /api/v1/tenants/{id}/status
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<TenantId>,
) -> AppResult<Json<DataResponse<TenantStatusView>>> {
    let status = state.orchestrator.tenant_status(id).await?;
    Ok(Json(DataResponse { data: status }))
}

/// DELETE /api/v1/tenants/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<TenantId>,
) -> AppResult<Json<DataResponse<TenantView>>> {
    let view = state.orchestrator.delete_tenant(id).await?;
    Ok(Json(DataResponse { data: view }))
}
