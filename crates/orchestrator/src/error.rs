//! Orchestrator error type.

use workhive_core::error::CoreError;
use workhive_db::repositories::TenantRepoError;

/// Fatal failures of a lifecycle operation.
///
/// Everything here aborts the call before the metadata commit point.
/// Infrastructure failures *after* the commit are not errors; they are
/// folded into the warnings on the returned view.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// A domain error: invalid plan, duplicate subdomain/subnet,
    /// missing tenant, bad input.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The metadata store failed before anything was committed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl From<TenantRepoError> for OrchestratorError {
    fn from(err: TenantRepoError) -> Self {
        match err {
            TenantRepoError::DuplicateSubdomain(subdomain) => {
                Self::Core(CoreError::DuplicateSubdomain { subdomain })
            }
            TenantRepoError::DuplicateSubnet(subnet) => {
                Self::Core(CoreError::DuplicateSubnet { subnet })
            }
            TenantRepoError::Database(e) => Self::Persistence(e),
        }
    }
}
