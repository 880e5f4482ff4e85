//! Durable storage for rendered tenant manifests.

use std::path::{Path, PathBuf};

use workhive_core::types::TenantId;

/// Stores one rendered deployment manifest per tenant, keyed by tenant
/// id. Writes are idempotent overwrites so a retried provisioning run
/// converges on the same file.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    template_path: PathBuf,
    output_dir: PathBuf,
}

impl ManifestStore {
    pub fn new(template_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Read the deployment template.
    pub async fn load_template(&self) -> Result<String, std::io::Error> {
        tokio::fs::read_to_string(&self.template_path).await
    }

    /// Persist a rendered manifest for the tenant, creating the output
    /// directory if needed. Returns the manifest path.
    pub async fn save(
        &self,
        tenant_id: TenantId,
        rendered: &str,
    ) -> Result<PathBuf, std::io::Error> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.path_for(tenant_id);
        tokio::fs::write(&path, rendered).await?;
        Ok(path)
    }

    /// The manifest location for a tenant, whether or not it exists yet.
    pub fn path_for(&self, tenant_id: TenantId) -> PathBuf {
        self.output_dir.join(format!("tenant-{tenant_id}.yml"))
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }
}
