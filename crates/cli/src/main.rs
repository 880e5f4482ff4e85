//! Operator CLI for the tenant lifecycle orchestrator.
//!
//! ```text
//! workhive create-tenant <name> [plan]   Create a new tenant
//! workhive delete-tenant <id>            Delete a tenant
//! workhive status-tenant <id>            Show tenant status
//! workhive list-tenants                  List all tenants
//! ```
//!
//! Talks to the database and container engine directly (no HTTP hop),
//! so it needs the same `DATABASE_URL` and template/manifest paths as
//! the API server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use workhive_core::plans::PlanCatalog;
use workhive_core::types::TenantId;
use workhive_db::models::tenant::TenantFilter;
use workhive_orchestrator::{Orchestrator, OrchestratorConfig};
use workhive_runtime::docker::DockerCli;
use workhive_runtime::{ManifestStore, ProbeConfig};

const USAGE: &str = "\
Usage:
  workhive create-tenant <name> [plan]
  workhive delete-tenant <id>
  workhive status-tenant <id>
  workhive list-tenants";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "workhive_cli=info,workhive_orchestrator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        bail!("{USAGE}");
    };

    let orchestrator = build_orchestrator().await?;

    match command {
        "create-tenant" => {
            let Some(name) = args.get(1) else {
                bail!("Usage: workhive create-tenant <name> [plan]");
            };
            let plan = args.get(2).map(String::as_str).unwrap_or("starter");

            println!("Creating tenant: {name} with plan: {plan}");
            let cancel = CancellationToken::new();
            let tenant = orchestrator.create_tenant(name, plan, &cancel).await?;

            println!();
            println!("{}", "=".repeat(60));
            println!("TENANT CREATED");
            println!("{}", "=".repeat(60));
            println!("ID:         {}", tenant.id);
            println!("Name:       {}", tenant.name);
            println!("Subdomain:  {}", tenant.subdomain);
            println!("Plan:       {}", tenant.plan);
            println!("Status:     {}", tenant.status);
            println!("Engine URL: {}", tenant.engine_url);
            print_warnings(&tenant.warnings);
        }

        "delete-tenant" => {
            let id = parse_id(args.get(1), "workhive delete-tenant <id>")?;

            println!("Deleting tenant: {id}");
            let tenant = orchestrator.delete_tenant(id).await?;

            println!();
            println!("TENANT DELETED");
            println!("ID:     {}", tenant.id);
            println!("Name:   {}", tenant.name);
            println!("Status: {}", tenant.status);
            print_warnings(&tenant.warnings);
        }

        "status-tenant" => {
            let id = parse_id(args.get(1), "workhive status-tenant <id>")?;
            let status = orchestrator.tenant_status(id).await?;

            println!();
            println!("{}", "=".repeat(60));
            println!("TENANT STATUS");
            println!("{}", "=".repeat(60));
            println!("ID:         {}", status.id);
            println!("Name:       {}", status.name);
            println!("Subdomain:  {}", status.subdomain);
            println!("Plan:       {}", status.plan);
            println!("Status:     {}", status.status);
            println!("Engine URL: {}", status.engine_url);
            println!();
            println!("Containers:");
            println!("  Engine:     {}", status.containers.engine);
            println!("  PostgreSQL: {}", status.containers.postgres);
            println!("  Redis:      {}", status.containers.redis);
            println!();
            println!("Metrics (last 30 days):");
            println!("  Total executions: {}", status.metrics.total_executions);
            println!("  Successful:       {}", status.metrics.successful_executions);
            println!("  Failed:           {}", status.metrics.failed_executions);
            println!();
            println!("Limits:");
            println!("  Max workflows:        {}", status.metrics.max_workflows);
            println!(
                "  Max executions/month: {}",
                status.metrics.max_executions_per_month
            );
            println!(
                "  Max content/week:     {}",
                status.metrics.max_content_units_per_week
            );
        }

        "list-tenants" => {
            let tenants = orchestrator.list_tenants(&TenantFilter::default()).await?;

            println!();
            println!("{}", "=".repeat(60));
            println!("TENANTS");
            println!("{}", "=".repeat(60));
            if tenants.is_empty() {
                println!("No tenants found");
            }
            for (i, tenant) in tenants.iter().enumerate() {
                println!();
                println!("{}. {}", i + 1, tenant.name);
                println!("   ID:        {}", tenant.id);
                println!("   Subdomain: {}", tenant.subdomain);
                println!("   Plan:      {}", tenant.plan);
                println!("   Status:    {}", tenant.status);
                println!("   Created:   {}", tenant.created_at);
            }
        }

        other => bail!("Unknown command '{other}'\n{USAGE}"),
    }

    Ok(())
}

/// Wire up the orchestrator from environment configuration.
async fn build_orchestrator() -> anyhow::Result<Orchestrator> {
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = workhive_db::create_pool(&database_url)
        .await
        .context("failed to connect to database")?;
    workhive_db::run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;

    let template_path = std::env::var("TENANT_TEMPLATE_PATH")
        .unwrap_or_else(|_| "deploy/tenant-template.yml".into());
    let manifest_dir =
        std::env::var("TENANT_MANIFEST_DIR").unwrap_or_else(|_| "deploy/tenants".into());
    let base_domain =
        std::env::var("BASE_DOMAIN").unwrap_or_else(|_| "app.workhive.io".into());

    Ok(Orchestrator::new(
        pool,
        Arc::new(DockerCli::new()),
        ManifestStore::new(template_path, manifest_dir),
        PlanCatalog,
        OrchestratorConfig {
            base_domain,
            probe: ProbeConfig {
                max_attempts: 30,
                interval: Duration::from_secs(2),
            },
        },
    ))
}

fn parse_id(arg: Option<&String>, usage: &str) -> anyhow::Result<TenantId> {
    let Some(raw) = arg else {
        bail!("Usage: {usage}");
    };
    raw.parse::<uuid::Uuid>()
        .with_context(|| format!("'{raw}' is not a valid tenant id"))
}

fn print_warnings(warnings: &[workhive_orchestrator::views::ProvisioningWarning]) {
    if warnings.is_empty() {
        return;
    }
    println!();
    println!("Warnings:");
    for w in warnings {
        println!("  [{}] {}", w.step, w.message);
    }
}
