//! Per-tenant credential generation.
//!
//! Secrets are generated once during provisioning and stored on the
//! tenant row; they are never re-derived afterwards.

use rand::Rng;

/// Length of generated database and cache passwords.
pub const SECRET_LENGTH: usize = 32;

/// Generate a random alphanumeric secret of the requested length.
///
/// Draws from the thread-local CSPRNG. Alphanumeric output keeps the
/// value URL-safe and shell-safe, so it can be interpolated into
/// deployment manifests without escaping.
pub fn generate_secret(length: usize) -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
