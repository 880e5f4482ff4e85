//! Deployment manifest rendering.
//!
//! Fills the per-tenant docker-compose template with tenant-specific
//! values. Pure string transform; reading the template and persisting
//! the rendered manifest are the manifest store's job.

use crate::types::TenantId;

/// Values interpolated into the tenant deployment template.
#[derive(Debug, Clone)]
pub struct ManifestContext {
    pub tenant_id: TenantId,
    pub tenant_name: String,
    pub plan_tier: String,
    pub subdomain: String,
    pub postgres_password: String,
    pub redis_password: String,
    pub subnet_cidr: String,
}

/// Render a deployment manifest from a template.
///
/// Replaces every occurrence of the `{{PLACEHOLDER}}` tokens below.
/// Unknown tokens are left untouched so a template typo surfaces in the
/// rendered output instead of vanishing silently.
///
/// | token                  | value                 |
/// |------------------------|-----------------------|
/// | `{{TENANT_ID}}`        | tenant UUID           |
/// | `{{TENANT_NAME}}`      | display name          |
/// | `{{PLAN_TIER}}`        | plan tier tag         |
/// | `{{SUBDOMAIN}}`        | derived subdomain     |
/// | `{{POSTGRES_PASSWORD}}`| database credential   |
/// | `{{REDIS_PASSWORD}}`   | cache credential      |
/// | `{{SUBNET_CIDR}}`      | allocated subnet      |
pub fn render_manifest(template: &str, ctx: &ManifestContext) -> String {
    template
        .replace("{{TENANT_ID}}", &ctx.tenant_id.to_string())
        .replace("{{TENANT_NAME}}", &ctx.tenant_name)
        .replace("{{PLAN_TIER}}", &ctx.plan_tier)
        .replace("{{SUBDOMAIN}}", &ctx.subdomain)
        .replace("{{POSTGRES_PASSWORD}}", &ctx.postgres_password)
        .replace("{{REDIS_PASSWORD}}", &ctx.redis_password)
        .replace("{{SUBNET_CIDR}}", &ctx.subnet_cidr)
}
