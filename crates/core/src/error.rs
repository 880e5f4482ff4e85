//! Domain error type shared across the workspace.

use crate::types::TenantId;

/// Domain-level errors surfaced by the orchestrator and its components.
///
/// The API layer maps each variant onto an HTTP status; the CLI prints
/// the `Display` form. Infrastructure failures that occur after the
/// tenant record has been committed are deliberately *not* represented
/// here; those are folded into per-operation warnings instead of
/// failing the call.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup by id came up empty (or the row is soft-deleted).
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: TenantId },

    /// The requested plan tier is not in the catalog.
    #[error("Invalid plan '{plan}'. Must be one of: starter, pro, business, enterprise")]
    InvalidPlan { plan: String },

    /// A live tenant already owns the derived subdomain.
    #[error("Subdomain '{subdomain}' already exists")]
    DuplicateSubdomain { subdomain: String },

    /// A live tenant already owns the allocated subnet block.
    #[error("Subnet '{subnet}' is already allocated")]
    DuplicateSubnet { subnet: String },

    /// Caller-correctable input problem.
    #[error("{0}")]
    Validation(String),

    /// Anything unexpected that should read as a 500.
    #[error("{0}")]
    Internal(String),
}
