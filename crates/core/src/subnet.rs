//! Subnet allocation policy for tenant networks.
//!
//! Each tenant owns a private `/24` out of `172.x.0.0`. The next block
//! is derived from the most recently created live tenant's block by
//! incrementing the second octet. This module is the pure half of the
//! allocator; the repository layer reads the "last assigned" value and
//! inserts inside one serialized transaction, and partial unique
//! indexes reject any collision that slips through.

use std::sync::LazyLock;

use regex::Regex;

/// First block handed out when no live tenant holds a subnet.
pub const SEED_SUBNET: &str = "172.100.0.0/24";

/// Pattern the stored subnet values are expected to match.
pub const SUBNET_PATTERN: &str = r"^172\.(\d+)\.0\.0/24$";

/// Compiled subnet pattern. Compiled once, reused forever.
static SUBNET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SUBNET_PATTERN).expect("valid regex"));

/// Compute the next subnet block after `last`.
///
/// * `None` (no live tenant has a subnet) → the seed block.
/// * A value matching [`SUBNET_PATTERN`] → same pattern with the second
///   octet incremented by one.
/// * Anything else → the seed block. A malformed stored value degrades
///   to the seed rather than failing the operation; the uniqueness
///   index on live subnets still rejects a real collision at insert.
pub fn next_subnet(last: Option<&str>) -> String {
    let Some(last) = last else {
        return SEED_SUBNET.to_string();
    };

    let Some(caps) = SUBNET_RE.captures(last) else {
        return SEED_SUBNET.to_string();
    };

    match caps[1].parse::<u32>() {
        Ok(octet) => format!("172.{}.0.0/24", octet + 1),
        Err(_) => SEED_SUBNET.to_string(),
    }
}
