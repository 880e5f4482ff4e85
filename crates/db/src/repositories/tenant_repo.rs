//! Repository for the `tenants` table.

use sqlx::PgPool;
use workhive_core::subnet::next_subnet;
use workhive_core::types::TenantId;

use crate::models::tenant::{
    ContainerIds, ExecutionStats, ProvisionRecord, Tenant, TenantFilter,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, subdomain, plan_tier, status, postgres_password, \
     redis_password, subnet_cidr, engine_url, engine_container_id, \
     postgres_container_id, redis_container_id, created_at, updated_at, deleted_at";

/// Advisory lock key serializing subnet allocation across concurrent
/// provisioning transactions. The "last assigned subnet" read has no
/// lockable row when the table is empty, so `SELECT ... FOR UPDATE`
/// cannot serialize the very first two creations; a transaction-scoped
/// advisory lock covers every case and releases on commit/rollback.
const SUBNET_ALLOCATION_LOCK: i64 = 0x7768_7375_626e_6574; // "whsubnet"

/// Errors from tenant persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum TenantRepoError {
    /// A live tenant already holds the requested subdomain.
    #[error("subdomain '{0}' is already taken by a live tenant")]
    DuplicateSubdomain(String),

    /// A live tenant already holds the allocated subnet block.
    #[error("subnet '{0}' is already allocated to a live tenant")]
    DuplicateSubnet(String),

    /// Any other database failure.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Provides persistence operations for tenants.
pub struct TenantRepo;

impl TenantRepo {
    /// Allocate the next subnet and insert a new `provisioning` tenant,
    /// all inside one transaction.
    ///
    /// The transaction takes an advisory lock, reads the most recently
    /// created live tenant's subnet, checks the subdomain is free among
    /// live tenants, and inserts. Two concurrent creations therefore
    /// cannot compute the same block or subdomain; the partial unique
    /// indexes on live rows remain as a last-resort backstop and are
    /// mapped onto the duplicate error variants here.
    pub async fn allocate_and_insert(
        pool: &PgPool,
        rec: &ProvisionRecord,
    ) -> Result<Tenant, TenantRepoError> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SUBNET_ALLOCATION_LOCK)
            .execute(&mut *tx)
            .await?;

        let last_subnet: Option<String> = sqlx::query_scalar(
            "SELECT subnet_cidr FROM tenants WHERE deleted_at IS NULL
             ORDER BY created_at DESC LIMIT 1",
        )
        .fetch_optional(&mut *tx)
        .await?;

        let subnet_cidr = next_subnet(last_subnet.as_deref());
        tracing::debug!(subnet = %subnet_cidr, subdomain = %rec.subdomain, "Allocated tenant subnet");

        let taken: Option<TenantId> = sqlx::query_scalar(
            "SELECT id FROM tenants WHERE subdomain = $1 AND deleted_at IS NULL",
        )
        .bind(&rec.subdomain)
        .fetch_optional(&mut *tx)
        .await?;

        if taken.is_some() {
            return Err(TenantRepoError::DuplicateSubdomain(rec.subdomain.clone()));
        }

        let query = format!(
            "INSERT INTO tenants (name, subdomain, plan_tier, status,
                 postgres_password, redis_password, subnet_cidr, engine_url)
             VALUES ($1, $2, $3, 'provisioning', $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let tenant = sqlx::query_as::<_, Tenant>(&query)
            .bind(&rec.name)
            .bind(&rec.subdomain)
            .bind(&rec.plan_tier)
            .bind(&rec.postgres_password)
            .bind(&rec.redis_password)
            .bind(&subnet_cidr)
            .bind(&rec.engine_url)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| classify_unique_violation(e, rec, &subnet_cidr))?;

        tx.commit().await?;
        Ok(tenant)
    }

    /// Find a tenant by id. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: TenantId) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tenants WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Tenant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a tenant by id, including soft-deleted rows.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: TenantId,
    ) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tenants WHERE id = $1");
        sqlx::query_as::<_, Tenant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tenants, newest first, optionally filtered by status and/or
    /// plan tier.
    ///
    /// Deleted tenants are included: a listing filtered on
    /// `status=deleted` must be able to see them.
    pub async fn list(pool: &PgPool, filter: &TenantFilter) -> Result<Vec<Tenant>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tenants
             WHERE ($1::text IS NULL OR status = $1)
               AND ($2::text IS NULL OR plan_tier = $2)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Tenant>(&query)
            .bind(&filter.status)
            .bind(&filter.plan)
            .fetch_all(pool)
            .await
    }

    /// Record the stack's container identifiers and mark the tenant
    /// `active`.
    ///
    /// The three id columns are overwritten wholesale: the identifiers
    /// always describe the tenant's current stack. Returns `None` if
    /// the tenant is absent or soft-deleted.
    pub async fn set_containers_active(
        pool: &PgPool,
        id: TenantId,
        ids: &ContainerIds,
    ) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!(
            "UPDATE tenants SET
                engine_container_id = $2,
                postgres_container_id = $3,
                redis_container_id = $4,
                status = 'active',
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tenant>(&query)
            .bind(id)
            .bind(&ids.engine)
            .bind(&ids.postgres)
            .bind(&ids.redis)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a tenant: status `deleted`, `deleted_at` set.
    ///
    /// Returns the updated row, or `None` when the tenant is absent or
    /// already deleted (soft delete is not repeatable).
    pub async fn soft_delete(pool: &PgPool, id: TenantId) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!(
            "UPDATE tenants SET
                status = 'deleted',
                deleted_at = NOW(),
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tenant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Aggregate workflow executions for a tenant over the trailing
    /// `days` window.
    pub async fn execution_stats(
        pool: &PgPool,
        id: TenantId,
        days: i32,
    ) -> Result<ExecutionStats, sqlx::Error> {
        sqlx::query_as::<_, ExecutionStats>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE status = 'success') AS succeeded,
                    COUNT(*) FILTER (WHERE status = 'error') AS failed
             FROM workflow_executions
             WHERE tenant_id = $1
               AND created_at >= NOW() - make_interval(days => $2)",
        )
        .bind(id)
        .bind(days)
        .fetch_one(pool)
        .await
    }
}

/// Map a unique-constraint violation on the live-tenant partial indexes
/// onto the matching duplicate error.
fn classify_unique_violation(
    err: sqlx::Error,
    rec: &ProvisionRecord,
    subnet: &str,
) -> TenantRepoError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            match db_err.constraint() {
                Some("uq_tenants_subdomain_live") => {
                    return TenantRepoError::DuplicateSubdomain(rec.subdomain.clone());
                }
                Some("uq_tenants_subnet_live") => {
                    return TenantRepoError::DuplicateSubnet(subnet.to_string());
                }
                _ => {}
            }
        }
    }
    TenantRepoError::Database(err)
}
