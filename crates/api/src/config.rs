use std::time::Duration;

use workhive_runtime::ProbeConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`). Tenant
    /// creation blocks on the readiness probe, so this must stay above
    /// `probe_max_attempts × probe_interval`.
    pub request_timeout_secs: u64,
    /// Domain under which tenant subdomains are exposed.
    pub base_domain: String,
    /// Path to the tenant deployment template.
    pub tenant_template_path: String,
    /// Directory holding rendered per-tenant manifests.
    pub tenant_manifest_dir: String,
    /// Readiness probe bounds.
    pub probe: ProbeConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                      |
    /// |------------------------|------------------------------|
    /// | `HOST`                 | `0.0.0.0`                    |
    /// | `PORT`                 | `3000`                       |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`      |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                        |
    /// | `BASE_DOMAIN`          | `app.workhive.io`            |
    /// | `TENANT_TEMPLATE_PATH` | `deploy/tenant-template.yml` |
    /// | `TENANT_MANIFEST_DIR`  | `deploy/tenants`             |
    /// | `PROBE_MAX_ATTEMPTS`   | `30`                         |
    /// | `PROBE_INTERVAL_SECS`  | `2`                          |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let base_domain =
            std::env::var("BASE_DOMAIN").unwrap_or_else(|_| "app.workhive.io".into());

        let tenant_template_path = std::env::var("TENANT_TEMPLATE_PATH")
            .unwrap_or_else(|_| "deploy/tenant-template.yml".into());

        let tenant_manifest_dir =
            std::env::var("TENANT_MANIFEST_DIR").unwrap_or_else(|_| "deploy/tenants".into());

        let probe_max_attempts: u32 = std::env::var("PROBE_MAX_ATTEMPTS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("PROBE_MAX_ATTEMPTS must be a valid u32");

        let probe_interval_secs: u64 = std::env::var("PROBE_INTERVAL_SECS")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("PROBE_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            base_domain,
            tenant_template_path,
            tenant_manifest_dir,
            probe: ProbeConfig {
                max_attempts: probe_max_attempts,
                interval: Duration::from_secs(probe_interval_secs),
            },
        }
    }
}
