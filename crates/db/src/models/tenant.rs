//! Tenant entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use workhive_core::status::TenantStatus;
use workhive_core::types::{TenantId, Timestamp};

/// A tenant row from the `tenants` table.
///
/// Credentials are write-once values generated at provisioning time;
/// they are skipped during serialization so a `Tenant` can never leak
/// them through an API response.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub subdomain: String,
    pub plan_tier: String,
    pub status: String,
    #[serde(skip_serializing)]
    pub postgres_password: String,
    #[serde(skip_serializing)]
    pub redis_password: String,
    pub subnet_cidr: String,
    pub engine_url: String,
    /// Identifiers of the tenant's current stack. `None` until the
    /// runtime reports them; replaced wholesale on re-provisioning.
    pub engine_container_id: Option<String>,
    pub postgres_container_id: Option<String>,
    pub redis_container_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl Tenant {
    /// Parse the stored status string into the typed state machine.
    pub fn lifecycle_status(&self) -> Result<TenantStatus, String> {
        TenantStatus::from_str_value(&self.status)
    }
}

/// Insert payload for a new tenant. The subnet is allocated inside the
/// insert transaction, not supplied by the caller.
#[derive(Debug, Clone)]
pub struct ProvisionRecord {
    pub name: String,
    pub subdomain: String,
    pub plan_tier: String,
    pub postgres_password: String,
    pub redis_password: String,
    pub engine_url: String,
}

/// Optional filters for tenant listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantFilter {
    pub status: Option<String>,
    pub plan: Option<String>,
}

/// Container identifiers reported by the runtime after stack start.
///
/// Any of these may be `None` when the runtime was still initializing
/// at discovery time.
#[derive(Debug, Clone, Default)]
pub struct ContainerIds {
    pub engine: Option<String>,
    pub postgres: Option<String>,
    pub redis: Option<String>,
}

/// 30-day workflow execution aggregate for one tenant.
#[derive(Debug, Clone, Copy, Default, FromRow, Serialize)]
pub struct ExecutionStats {
    pub total: i64,
    pub succeeded: i64,
    pub failed: i64,
}
