//! Integration tests for the lifecycle sagas, driven against a real
//! database and the in-memory container runtime.

use std::sync::Arc;

use assert_matches::assert_matches;
use sqlx::PgPool;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use workhive_core::error::CoreError;
use workhive_core::plans::PlanCatalog;
use workhive_db::models::tenant::TenantFilter;
use workhive_orchestrator::lifecycle::network_name;
use workhive_orchestrator::{Orchestrator, OrchestratorConfig, OrchestratorError};
use workhive_runtime::fake::InMemoryRuntime;
use workhive_runtime::{ContainerRuntime, ManifestStore, ProbeConfig};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TEMPLATE: &str = "\
# tenant {{TENANT_NAME}} ({{PLAN_TIER}})
id: {{TENANT_ID}}
subdomain: {{SUBDOMAIN}}
postgres_password: {{POSTGRES_PASSWORD}}
redis_password: {{REDIS_PASSWORD}}
subnet: {{SUBNET_CIDR}}
";

struct Harness {
    orchestrator: Orchestrator,
    runtime: Arc<InMemoryRuntime>,
    manifests: ManifestStore,
    // Keeps the manifest directory alive for the test's duration.
    _dir: TempDir,
}

async fn harness(pool: PgPool) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("tenant-template.yml");
    tokio::fs::write(&template_path, TEMPLATE).await.unwrap();

    let manifests = ManifestStore::new(&template_path, dir.path().join("tenants"));
    let runtime = Arc::new(InMemoryRuntime::new());
    let config = OrchestratorConfig {
        base_domain: "app.workhive.io".to_string(),
        probe: ProbeConfig {
            max_attempts: 3,
            interval: std::time::Duration::from_millis(1),
        },
    };

    let orchestrator = Orchestrator::new(
        pool,
        Arc::clone(&runtime) as Arc<dyn workhive_runtime::ContainerRuntime>,
        manifests.clone(),
        PlanCatalog,
        config,
    );

    Harness {
        orchestrator,
        runtime,
        manifests,
        _dir: dir,
    }
}

fn cancel() -> CancellationToken {
    CancellationToken::new()
}

// ---------------------------------------------------------------------------
// CreateTenant
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_tenant_happy_path(pool: PgPool) {
    let h = harness(pool).await;

    let view = h
        .orchestrator
        .create_tenant("Acme Corp!", "pro", &cancel())
        .await
        .unwrap();

    assert_eq!(view.subdomain, "acme-corp");
    assert_eq!(view.plan, "pro");
    assert_eq!(view.status, "active");
    assert_eq!(view.engine_url, "https://acme-corp.app.workhive.io");
    assert!(view.warnings.is_empty(), "clean run must carry no warnings");
    assert!(view.containers.engine.is_some());
    assert!(view.containers.postgres.is_some());
    assert!(view.containers.redis.is_some());

    // The isolated network was created for the tenant.
    assert!(h.runtime.network_exists(&network_name(view.id)));

    // The rendered manifest was persisted with every placeholder filled.
    let manifest = tokio::fs::read_to_string(h.manifests.path_for(view.id))
        .await
        .unwrap();
    assert!(manifest.contains(&view.id.to_string()));
    assert!(manifest.contains("subdomain: acme-corp"));
    assert!(manifest.contains("subnet: 172.100.0.0/24"));
    assert!(!manifest.contains("{{"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_tenant_limits_match_catalog(pool: PgPool) {
    let h = harness(pool).await;

    let view = h
        .orchestrator
        .create_tenant("Acme Corp!", "pro", &cancel())
        .await
        .unwrap();
    let status = h.orchestrator.tenant_status(view.id).await.unwrap();

    assert_eq!(status.metrics.max_workflows, 25);
    assert_eq!(status.metrics.max_executions_per_month, 50_000);
    assert_eq!(status.metrics.max_content_units_per_week, 8);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_tenant_rejects_unknown_plan(pool: PgPool) {
    let h = harness(pool).await;

    let err = h
        .orchestrator
        .create_tenant("x", "gold", &cancel())
        .await
        .unwrap_err();
    assert_matches!(
        err,
        OrchestratorError::Core(CoreError::InvalidPlan { plan }) if plan == "gold"
    );

    // Nothing was persisted.
    let all = h
        .orchestrator
        .list_tenants(&TenantFilter::default())
        .await
        .unwrap();
    assert!(all.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_tenant_rejects_unsluggable_name(pool: PgPool) {
    let h = harness(pool).await;

    let err = h
        .orchestrator
        .create_tenant("!!! ???", "starter", &cancel())
        .await
        .unwrap_err();
    assert_matches!(err, OrchestratorError::Core(CoreError::Validation(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_tenant_rejects_duplicate_subdomain(pool: PgPool) {
    let h = harness(pool).await;

    h.orchestrator
        .create_tenant("Acme Corp", "starter", &cancel())
        .await
        .unwrap();

    // Same slug, different display name.
    let err = h
        .orchestrator
        .create_tenant("acme CORP", "pro", &cancel())
        .await
        .unwrap_err();
    assert_matches!(
        err,
        OrchestratorError::Core(CoreError::DuplicateSubdomain { subdomain })
            if subdomain == "acme-corp"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn partial_failure_still_reserves_subdomain(pool: PgPool) {
    let h = harness(pool).await;
    h.runtime.fail_compose_up("daemon unreachable");

    // The stack never starts, but the record is committed and the call
    // succeeds with warnings.
    let view = h
        .orchestrator
        .create_tenant("Acme", "starter", &cancel())
        .await
        .unwrap();
    assert_eq!(view.status, "active");
    assert!(view.warnings.iter().any(|w| w.step == "compose_up"));
    assert!(view.containers.engine.is_none());

    // Retrying the same name must be rejected, not silently retried.
    let err = h
        .orchestrator
        .create_tenant("Acme", "starter", &cancel())
        .await
        .unwrap_err();
    assert_matches!(
        err,
        OrchestratorError::Core(CoreError::DuplicateSubdomain { .. })
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn readiness_timeout_does_not_gate_creation(pool: PgPool) {
    let h = harness(pool).await;
    h.runtime.register_unhealthy_stacks();

    let view = h
        .orchestrator
        .create_tenant("Slow Start", "starter", &cancel())
        .await
        .unwrap();

    // Still active, with the timeout surfaced as a warning.
    assert_eq!(view.status, "active");
    assert!(view.containers.engine.is_some());
    let readiness = view
        .warnings
        .iter()
        .find(|w| w.step == "readiness")
        .expect("readiness warning expected");
    assert!(readiness.message.contains("3 attempts"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn slow_runtime_leaves_container_ids_unset(pool: PgPool) {
    let h = harness(pool).await;
    h.runtime.suppress_container_registration();

    let view = h
        .orchestrator
        .create_tenant("Laggy", "starter", &cancel())
        .await
        .unwrap();

    // Missing ids are not an error, and with no engine id there is no
    // readiness probe to fail.
    assert_eq!(view.status, "active");
    assert!(view.containers.engine.is_none());
    assert!(view.containers.postgres.is_none());
    assert!(view.containers.redis.is_none());
    assert!(view.warnings.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_creations_get_distinct_resources(pool: PgPool) {
    let h = harness(pool).await;

    let (ca, cb) = (cancel(), cancel());
    let (a, b) = tokio::join!(
        h.orchestrator.create_tenant("Alpha", "starter", &ca),
        h.orchestrator.create_tenant("Beta", "starter", &cb),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    assert_ne!(a.subdomain, b.subdomain);

    let a_status = h.orchestrator.tenant_status(a.id).await.unwrap();
    let b_status = h.orchestrator.tenant_status(b.id).await.unwrap();
    assert_ne!(a_status.id, b_status.id);
}

// ---------------------------------------------------------------------------
// DeleteTenant
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_tenant_tears_down_and_soft_deletes(pool: PgPool) {
    let h = harness(pool).await;

    let created = h
        .orchestrator
        .create_tenant("Doomed", "starter", &cancel())
        .await
        .unwrap();

    let deleted = h.orchestrator.delete_tenant(created.id).await.unwrap();
    assert_eq!(deleted.status, "deleted");
    assert!(deleted.deleted_at.is_some());
    assert!(deleted.warnings.is_empty());

    // Infrastructure was asked to tear down both the stack and network.
    assert_eq!(
        h.runtime.downed_manifests(),
        vec![h.manifests.path_for(created.id)]
    );
    assert!(h
        .runtime
        .removed_networks()
        .contains(&network_name(created.id)));

    // The record is gone from status queries...
    let err = h.orchestrator.tenant_status(created.id).await.unwrap_err();
    assert_matches!(err, OrchestratorError::Core(CoreError::NotFound { .. }));

    // ...but an explicit deleted filter still sees it.
    let deleted_list = h
        .orchestrator
        .list_tenants(&TenantFilter {
            status: Some("deleted".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(deleted_list.len(), 1);
    assert_eq!(deleted_list[0].status, "deleted");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_tenant_twice_is_not_found(pool: PgPool) {
    let h = harness(pool).await;

    let created = h
        .orchestrator
        .create_tenant("Once", "starter", &cancel())
        .await
        .unwrap();
    h.orchestrator.delete_tenant(created.id).await.unwrap();

    let err = h.orchestrator.delete_tenant(created.id).await.unwrap_err();
    assert_matches!(err, OrchestratorError::Core(CoreError::NotFound { .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_unknown_tenant_is_not_found(pool: PgPool) {
    let h = harness(pool).await;

    let err = h
        .orchestrator
        .delete_tenant(uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert_matches!(err, OrchestratorError::Core(CoreError::NotFound { .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_survives_infrastructure_failures(pool: PgPool) {
    let h = harness(pool).await;

    let created = h
        .orchestrator
        .create_tenant("Stubborn", "starter", &cancel())
        .await
        .unwrap();

    // Containers already gone, network removal broken: the tenant must
    // still become deleted, with both problems reported.
    h.runtime.fail_compose_down("no such stack");
    h.runtime.fail_remove_network("daemon unreachable");

    let deleted = h.orchestrator.delete_tenant(created.id).await.unwrap();
    assert_eq!(deleted.status, "deleted");
    assert!(deleted.warnings.iter().any(|w| w.step == "compose_down"));
    assert!(deleted.warnings.iter().any(|w| w.step == "network_remove"));
}

// ---------------------------------------------------------------------------
// GetTenantStatus
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_reports_running_containers_and_metrics(pool: PgPool) {
    let h = harness(pool.clone()).await;

    let created = h
        .orchestrator
        .create_tenant("Watched", "pro", &cancel())
        .await
        .unwrap();

    // Two recorded executions inside the 30-day window.
    for status in ["success", "error"] {
        sqlx::query(
            "INSERT INTO workflow_executions (tenant_id, status) VALUES ($1, $2)",
        )
        .bind(created.id)
        .bind(status)
        .execute(&pool)
        .await
        .unwrap();
    }

    let status = h.orchestrator.tenant_status(created.id).await.unwrap();
    assert_eq!(status.containers.engine, "running");
    assert_eq!(status.containers.postgres, "running");
    assert_eq!(status.containers.redis, "running");
    assert_eq!(status.metrics.total_executions, 2);
    assert_eq!(status.metrics.successful_executions, 1);
    assert_eq!(status.metrics.failed_executions, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_degrades_missing_containers_to_not_found(pool: PgPool) {
    let h = harness(pool).await;

    let created = h
        .orchestrator
        .create_tenant("Vanished", "starter", &cancel())
        .await
        .unwrap();

    // Containers removed out-of-band after creation.
    h.runtime
        .compose_down(&h.manifests.path_for(created.id))
        .await
        .unwrap();

    let status = h.orchestrator.tenant_status(created.id).await.unwrap();
    assert_eq!(status.containers.engine, "not_found");
    assert_eq!(status.containers.postgres, "not_found");
    assert_eq!(status.containers.redis, "not_found");
    // Partial visibility: the query itself still succeeded.
    assert_eq!(status.status, "active");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_with_unset_ids_is_not_found_per_container(pool: PgPool) {
    let h = harness(pool).await;
    h.runtime.suppress_container_registration();

    let created = h
        .orchestrator
        .create_tenant("Idless", "starter", &cancel())
        .await
        .unwrap();

    let status = h.orchestrator.tenant_status(created.id).await.unwrap();
    assert_eq!(status.containers.engine, "not_found");
    assert_eq!(status.containers.postgres, "not_found");
    assert_eq!(status.containers.redis, "not_found");
}

// ---------------------------------------------------------------------------
// ListTenants
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_status_and_plan(pool: PgPool) {
    let h = harness(pool).await;

    let a = h
        .orchestrator
        .create_tenant("First", "starter", &cancel())
        .await
        .unwrap();
    let b = h
        .orchestrator
        .create_tenant("Second", "pro", &cancel())
        .await
        .unwrap();
    h.orchestrator.delete_tenant(a.id).await.unwrap();

    // Unfiltered: both rows, newest first.
    let all = h
        .orchestrator
        .list_tenants(&TenantFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, b.id);

    let active = h
        .orchestrator
        .list_tenants(&TenantFilter {
            status: Some("active".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, b.id);

    let pros = h
        .orchestrator
        .list_tenants(&TenantFilter {
            plan: Some("pro".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(pros.len(), 1);
    assert_eq!(pros[0].id, b.id);
}
