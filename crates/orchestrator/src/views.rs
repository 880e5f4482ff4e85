//! Caller-facing result views.
//!
//! Views never carry tenant credentials; they are the only shapes the
//! API and CLI layers see.

use serde::Serialize;
use workhive_core::plans::PlanLimits;
use workhive_core::types::{TenantId, Timestamp};
use workhive_db::models::tenant::{ExecutionStats, Tenant};

/// A non-fatal problem encountered after the tenant record was
/// committed. The operation still succeeded; the tenant may need
/// operator attention.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisioningWarning {
    /// Saga step that degraded (e.g. `compose_up`, `readiness`).
    pub step: &'static str,
    pub message: String,
}

/// Identifiers of the tenant's three managed containers, as last
/// reported by the runtime. `None` means the runtime had not reported
/// the container yet.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContainerIdsView {
    pub engine: Option<String>,
    pub postgres: Option<String>,
    pub redis: Option<String>,
}

/// Result of `CreateTenant` and `DeleteTenant`.
#[derive(Debug, Clone, Serialize)]
pub struct TenantView {
    pub id: TenantId,
    pub name: String,
    pub subdomain: String,
    pub plan: String,
    pub status: String,
    pub engine_url: String,
    pub containers: ContainerIdsView,
    pub created_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
    /// Non-fatal degradations collected during the operation. Empty on
    /// a clean run.
    pub warnings: Vec<ProvisioningWarning>,
}

impl TenantView {
    pub fn from_tenant(tenant: &Tenant, warnings: Vec<ProvisioningWarning>) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name.clone(),
            subdomain: tenant.subdomain.clone(),
            plan: tenant.plan_tier.clone(),
            status: tenant.status.clone(),
            engine_url: tenant.engine_url.clone(),
            containers: ContainerIdsView {
                engine: tenant.engine_container_id.clone(),
                postgres: tenant.postgres_container_id.clone(),
                redis: tenant.redis_container_id.clone(),
            },
            created_at: tenant.created_at,
            deleted_at: tenant.deleted_at,
            warnings,
        }
    }
}

/// Live per-container state for a status query. `not_found` stands in
/// for both an unset identifier and a failed inspection.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerStatesView {
    pub engine: String,
    pub postgres: String,
    pub redis: String,
}

/// Usage metrics joined onto a status view.
#[derive(Debug, Clone, Serialize)]
pub struct TenantMetricsView {
    pub total_executions: i64,
    pub successful_executions: i64,
    pub failed_executions: i64,
    pub max_workflows: i64,
    pub max_executions_per_month: i64,
    pub max_content_units_per_week: i64,
}

impl TenantMetricsView {
    pub fn new(stats: ExecutionStats, limits: PlanLimits) -> Self {
        Self {
            total_executions: stats.total,
            successful_executions: stats.succeeded,
            failed_executions: stats.failed,
            max_workflows: limits.max_workflows,
            max_executions_per_month: limits.max_executions_per_month,
            max_content_units_per_week: limits.max_content_units_per_week,
        }
    }
}

/// Result of `GetTenantStatus`: the persisted record joined with the
/// 30-day execution aggregate and live container states.
#[derive(Debug, Clone, Serialize)]
pub struct TenantStatusView {
    pub id: TenantId,
    pub name: String,
    pub subdomain: String,
    pub plan: String,
    pub status: String,
    pub engine_url: String,
    pub containers: ContainerStatesView,
    pub metrics: TenantMetricsView,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One row of `ListTenants`: a cheap point-in-time snapshot with no
/// live container join.
#[derive(Debug, Clone, Serialize)]
pub struct TenantSummaryView {
    pub id: TenantId,
    pub name: String,
    pub subdomain: String,
    pub plan: String,
    pub status: String,
    pub engine_url: String,
    pub created_at: Timestamp,
}

impl From<&Tenant> for TenantSummaryView {
    fn from(tenant: &Tenant) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name.clone(),
            subdomain: tenant.subdomain.clone(),
            plan: tenant.plan_tier.clone(),
            status: tenant.status.clone(),
            engine_url: tenant.engine_url.clone(),
            created_at: tenant.created_at,
        }
    }
}
