//! The tenant lifecycle saga coordinator.
//!
//! Every operation follows the same partial-failure policy: anything
//! that fails before the tenant row is committed aborts the call with
//! no visible state change; anything after it is logged, folded into
//! the returned warnings, and never rolls the metadata back. A tenant
//! stuck in a degraded-but-recoverable state beats a silently discarded
//! subdomain and subnet reservation.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use workhive_core::error::CoreError;
use workhive_core::manifest::{render_manifest, ManifestContext};
use workhive_core::plans::{PlanCatalog, PlanTier};
use workhive_core::secrets::{generate_secret, SECRET_LENGTH};
use workhive_core::slug::subdomain_from_name;
use workhive_core::types::TenantId;
use workhive_db::models::tenant::{ContainerIds, ProvisionRecord, Tenant, TenantFilter};
use workhive_db::repositories::TenantRepo;
use workhive_db::DbPool;
use workhive_runtime::{wait_until_ready, ContainerRuntime, ManifestStore, ProbeConfig};

use crate::error::OrchestratorError;
use crate::views::{
    ContainerStatesView, ProvisioningWarning, TenantMetricsView, TenantStatusView,
    TenantSummaryView, TenantView,
};

/// Window for the execution aggregate on status views.
const METRICS_WINDOW_DAYS: i32 = 30;

/// Orchestrator settings that vary by deployment.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Domain under which tenant subdomains are exposed.
    pub base_domain: String,
    /// Readiness probe bounds for newly started stacks.
    pub probe: ProbeConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            base_domain: "app.workhive.io".to_string(),
            probe: ProbeConfig::default(),
        }
    }
}

/// Sequences tenant create/delete/status/list against the metadata
/// store and the container runtime.
///
/// Cheap to clone; shared across request handlers.
#[derive(Clone)]
pub struct Orchestrator {
    pool: DbPool,
    runtime: Arc<dyn ContainerRuntime>,
    manifests: ManifestStore,
    catalog: PlanCatalog,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        pool: DbPool,
        runtime: Arc<dyn ContainerRuntime>,
        manifests: ManifestStore,
        catalog: PlanCatalog,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            pool,
            runtime,
            manifests,
            catalog,
            config,
        }
    }

    /// Provision a new tenant: reserve metadata, then bring up the
    /// isolated stack.
    ///
    /// The metadata insert (subdomain + subnet + credentials, status
    /// `provisioning`) is the commit point. Infrastructure failures
    /// beyond it degrade to warnings, and the tenant is marked `active`
    /// unconditionally at the end so a slow or failed health check can
    /// never strand the record in `provisioning`.
    pub async fn create_tenant(
        &self,
        name: &str,
        plan: &str,
        cancel: &CancellationToken,
    ) -> Result<TenantView, OrchestratorError> {
        let tier = PlanTier::from_str_value(plan)?;

        let subdomain = subdomain_from_name(name);
        if subdomain.is_empty() {
            return Err(CoreError::Validation(
                "Tenant name must contain at least one alphanumeric character".to_string(),
            )
            .into());
        }

        let record = ProvisionRecord {
            name: name.to_string(),
            subdomain: subdomain.clone(),
            plan_tier: tier.as_str().to_string(),
            postgres_password: generate_secret(SECRET_LENGTH),
            redis_password: generate_secret(SECRET_LENGTH),
            engine_url: format!("https://{subdomain}.{}", self.config.base_domain),
        };

        // Commit point: subnet allocation and insert share one
        // serialized transaction. Nothing else has happened yet, so a
        // failure here aborts the whole operation cleanly.
        let tenant = TenantRepo::allocate_and_insert(&self.pool, &record).await?;
        tracing::info!(
            tenant_id = %tenant.id,
            subdomain = %tenant.subdomain,
            plan = %tenant.plan_tier,
            subnet = %tenant.subnet_cidr,
            "Tenant record created, starting stack",
        );

        let mut warnings = Vec::new();
        let ids = self.start_stack(&tenant, cancel, &mut warnings).await;

        // Unconditional: runs even when the stack or the probe
        // degraded, so the tenant always leaves `provisioning`.
        match TenantRepo::set_containers_active(&self.pool, tenant.id, &ids).await {
            Ok(Some(updated)) => {
                tracing::info!(tenant_id = %updated.id, "Tenant active");
                Ok(TenantView::from_tenant(&updated, warnings))
            }
            Ok(None) => {
                // Deleted out from under us mid-provisioning; report
                // what we know.
                warn_step(
                    &mut warnings,
                    tenant.id,
                    "activate",
                    "tenant disappeared before activation".to_string(),
                );
                Ok(TenantView::from_tenant(&tenant, warnings))
            }
            Err(e) => {
                warn_step(
                    &mut warnings,
                    tenant.id,
                    "activate",
                    format!("failed to persist container ids: {e}"),
                );
                Ok(TenantView::from_tenant(&tenant, warnings))
            }
        }
    }

    /// Tear down a tenant's stack and soft-delete its record.
    ///
    /// Teardown is best-effort: a tenant whose containers are already
    /// gone must still be deletable, so runtime errors become warnings
    /// and the soft delete always runs.
    pub async fn delete_tenant(&self, id: TenantId) -> Result<TenantView, OrchestratorError> {
        let tenant = TenantRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Tenant",
                id,
            })?;

        let mut warnings = Vec::new();

        let manifest = self.manifests.path_for(tenant.id);
        tracing::info!(tenant_id = %tenant.id, "Stopping tenant stack");
        if let Err(e) = self.runtime.compose_down(&manifest).await {
            warn_step(
                &mut warnings,
                tenant.id,
                "compose_down",
                format!("failed to stop stack: {e}"),
            );
        }

        if let Err(e) = self.runtime.remove_network(&network_name(tenant.id)).await {
            warn_step(
                &mut warnings,
                tenant.id,
                "network_remove",
                format!("failed to remove network: {e}"),
            );
        }

        // Always executes: the record must reflect the delete intent
        // even when infrastructure cleanup was incomplete. Teardown is
        // idempotent, so operators can retry cleanup independently.
        let deleted = TenantRepo::soft_delete(&self.pool, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Tenant",
                id,
            })?;

        tracing::info!(tenant_id = %deleted.id, "Tenant deleted");
        Ok(TenantView::from_tenant(&deleted, warnings))
    }

    /// The persisted record joined with usage metrics and live
    /// container states.
    ///
    /// Container inspections run independently; an unset identifier or
    /// a failed inspection yields `not_found` for that container
    /// rather than failing the query.
    pub async fn tenant_status(&self, id: TenantId) -> Result<TenantStatusView, OrchestratorError> {
        let tenant = TenantRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Tenant",
                id,
            })?;

        let stats = TenantRepo::execution_stats(&self.pool, id, METRICS_WINDOW_DAYS).await?;

        let limits = self
            .catalog
            .limits_for(&tenant.plan_tier)
            .map_err(|_| {
                CoreError::Internal(format!(
                    "tenant {} carries unknown plan tier '{}'",
                    tenant.id, tenant.plan_tier
                ))
            })?;

        let containers = ContainerStatesView {
            engine: self.container_state(tenant.engine_container_id.as_deref()).await,
            postgres: self
                .container_state(tenant.postgres_container_id.as_deref())
                .await,
            redis: self.container_state(tenant.redis_container_id.as_deref()).await,
        };

        Ok(TenantStatusView {
            id: tenant.id,
            name: tenant.name,
            subdomain: tenant.subdomain,
            plan: tenant.plan_tier,
            status: tenant.status,
            engine_url: tenant.engine_url,
            containers,
            metrics: TenantMetricsView::new(stats, limits),
            created_at: tenant.created_at,
            updated_at: tenant.updated_at,
        })
    }

    /// Point-in-time tenant listing, newest first. No live container
    /// join; deleted tenants are visible to an explicit status filter.
    pub async fn list_tenants(
        &self,
        filter: &TenantFilter,
    ) -> Result<Vec<TenantSummaryView>, OrchestratorError> {
        let tenants = TenantRepo::list(&self.pool, filter).await?;
        Ok(tenants.iter().map(TenantSummaryView::from).collect())
    }

    // -- saga internals -----------------------------------------------------

    /// Bring up the tenant's stack: manifest, network, compose,
    /// container discovery, readiness. Never fails: every degradation
    /// lands in `warnings` and the best-known container ids are
    /// returned for the activation update.
    async fn start_stack(
        &self,
        tenant: &Tenant,
        cancel: &CancellationToken,
        warnings: &mut Vec<ProvisioningWarning>,
    ) -> ContainerIds {
        // Render and persist the manifest. Without it the stack cannot
        // start, so the remaining steps are skipped.
        let manifest_path = match self.render_and_save_manifest(tenant).await {
            Ok(path) => path,
            Err(message) => {
                warn_step(warnings, tenant.id, "manifest", message);
                return ContainerIds::default();
            }
        };

        if let Err(e) = self
            .runtime
            .create_network(&network_name(tenant.id), &tenant.subnet_cidr)
            .await
        {
            warn_step(
                warnings,
                tenant.id,
                "network_create",
                format!("failed to create network: {e}"),
            );
        }

        if let Err(e) = self.runtime.compose_up(&manifest_path).await {
            warn_step(
                warnings,
                tenant.id,
                "compose_up",
                format!("failed to start stack: {e}"),
            );
        }

        // The runtime may still be initializing; an id that is not
        // there yet is fine at this point.
        let ids = ContainerIds {
            engine: self
                .discover_container(tenant, "engine", warnings)
                .await,
            postgres: self
                .discover_container(tenant, "postgres", warnings)
                .await,
            redis: self.discover_container(tenant, "redis", warnings).await,
        };

        if let Some(engine_id) = ids.engine.as_deref() {
            match wait_until_ready(
                self.runtime.as_ref(),
                engine_id,
                &self.config.probe,
                cancel,
            )
            .await
            {
                Ok(attempts) => {
                    tracing::info!(
                        tenant_id = %tenant.id,
                        attempts,
                        "Engine ready",
                    );
                }
                // Readiness is a best-effort signal, not a creation
                // gate: cold starts are expected to be slow.
                Err(e) => {
                    warn_step(
                        warnings,
                        tenant.id,
                        "readiness",
                        format!("engine not confirmed ready: {e}"),
                    );
                }
            }
        }

        ids
    }

    async fn render_and_save_manifest(&self, tenant: &Tenant) -> Result<std::path::PathBuf, String> {
        let template = self
            .manifests
            .load_template()
            .await
            .map_err(|e| format!("failed to read manifest template: {e}"))?;

        let rendered = render_manifest(
            &template,
            &ManifestContext {
                tenant_id: tenant.id,
                tenant_name: tenant.name.clone(),
                plan_tier: tenant.plan_tier.clone(),
                subdomain: tenant.subdomain.clone(),
                postgres_password: tenant.postgres_password.clone(),
                redis_password: tenant.redis_password.clone(),
                subnet_cidr: tenant.subnet_cidr.clone(),
            },
        );

        self.manifests
            .save(tenant.id, &rendered)
            .await
            .map_err(|e| format!("failed to persist manifest: {e}"))
    }

    async fn discover_container(
        &self,
        tenant: &Tenant,
        service: &str,
        warnings: &mut Vec<ProvisioningWarning>,
    ) -> Option<String> {
        match self
            .runtime
            .find_container(&container_name(service, tenant.id))
            .await
        {
            Ok(id) => id,
            Err(e) => {
                warn_step(
                    warnings,
                    tenant.id,
                    "discover",
                    format!("failed to look up {service} container: {e}"),
                );
                None
            }
        }
    }

    async fn container_state(&self, container: Option<&str>) -> String {
        let Some(container) = container else {
            return "not_found".to_string();
        };
        match self.runtime.inspect_state(container).await {
            Ok(state) => state.as_str().to_string(),
            Err(_) => "not_found".to_string(),
        }
    }
}

/// Isolated network name for a tenant.
pub fn network_name(id: TenantId) -> String {
    format!("tenant_{id}")
}

/// Container name for one of the tenant's managed services.
pub fn container_name(service: &str, id: TenantId) -> String {
    format!("{service}-tenant-{id}")
}

fn warn_step(
    warnings: &mut Vec<ProvisioningWarning>,
    tenant_id: TenantId,
    step: &'static str,
    message: String,
) {
    tracing::warn!(%tenant_id, step, %message, "Lifecycle step degraded");
    warnings.push(ProvisioningWarning { step, message });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_name_embeds_tenant_id() {
        let id = uuid::Uuid::nil();
        assert_eq!(
            network_name(id),
            "tenant_00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn container_name_embeds_service_and_tenant() {
        let id = uuid::Uuid::nil();
        assert_eq!(
            container_name("engine", id),
            "engine-tenant-00000000-0000-0000-0000-000000000000"
        );
    }
}
