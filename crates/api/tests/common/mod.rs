use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use workhive_api::config::ServerConfig;
use workhive_api::router::build_app_router;
use workhive_api::state::AppState;
use workhive_core::plans::PlanCatalog;
use workhive_orchestrator::{Orchestrator, OrchestratorConfig};
use workhive_runtime::fake::InMemoryRuntime;
use workhive_runtime::{ManifestStore, ProbeConfig};

/// Minimal deployment template with every supported placeholder.
const TEMPLATE: &str = "\
id: {{TENANT_ID}}
name: {{TENANT_NAME}}
plan: {{PLAN_TIER}}
subdomain: {{SUBDOMAIN}}
postgres_password: {{POSTGRES_PASSWORD}}
redis_password: {{REDIS_PASSWORD}}
subnet: {{SUBNET_CIDR}}
";

/// A fully wired test application backed by the in-memory runtime.
pub struct TestApp {
    pub router: Router,
    pub runtime: Arc<InMemoryRuntime>,
    // Keeps the manifest directory alive for the test's duration.
    _dir: TempDir,
}

/// Build a test `ServerConfig` with safe defaults and a fast probe.
pub fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        base_domain: "app.workhive.io".to_string(),
        tenant_template_path: dir
            .path()
            .join("tenant-template.yml")
            .to_string_lossy()
            .to_string(),
        tenant_manifest_dir: dir.path().join("tenants").to_string_lossy().to_string(),
        probe: ProbeConfig {
            max_attempts: 3,
            interval: std::time::Duration::from_millis(1),
        },
    }
}

/// Build the full application with all middleware layers, using the
/// given database pool and an [`InMemoryRuntime`].
///
/// This mirrors the wiring in `main.rs` so integration tests exercise
/// the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub async fn test_app(pool: PgPool) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);

    tokio::fs::write(&config.tenant_template_path, TEMPLATE)
        .await
        .unwrap();

    let runtime = Arc::new(InMemoryRuntime::new());
    let manifests = ManifestStore::new(&config.tenant_template_path, &config.tenant_manifest_dir);
    let orchestrator = Orchestrator::new(
        pool.clone(),
        Arc::clone(&runtime) as Arc<dyn workhive_runtime::ContainerRuntime>,
        manifests,
        PlanCatalog,
        OrchestratorConfig {
            base_domain: config.base_domain.clone(),
            probe: config.probe,
        },
    );

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        orchestrator: Arc::new(orchestrator),
    };

    TestApp {
        router: build_app_router(state, &config),
        runtime,
        _dir: dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
