//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod tenant_repo;

pub use tenant_repo::{TenantRepo, TenantRepoError};
