//! Plan catalog: tier names and the resource limits attached to each.
//!
//! The catalog is an immutable value constructed once at startup and
//! passed into the orchestrator as a dependency. Limits are never
//! persisted on the tenant row beyond the tier tag; callers look them
//! up here on demand.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const TIER_STARTER: &str = "starter";
pub const TIER_PRO: &str = "pro";
pub const TIER_BUSINESS: &str = "business";
pub const TIER_ENTERPRISE: &str = "enterprise";

/// All recognized plan tier names.
pub const VALID_PLAN_TIERS: &[&str] =
    &[TIER_STARTER, TIER_PRO, TIER_BUSINESS, TIER_ENTERPRISE];

/// Sentinel used for "effectively unlimited" limits.
const UNLIMITED: i64 = 999_999;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A recognized plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Starter,
    Pro,
    Business,
    Enterprise,
}

impl PlanTier {
    /// Parse a tier from its database/API string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            TIER_STARTER => Ok(Self::Starter),
            TIER_PRO => Ok(Self::Pro),
            TIER_BUSINESS => Ok(Self::Business),
            TIER_ENTERPRISE => Ok(Self::Enterprise),
            _ => Err(CoreError::InvalidPlan {
                plan: s.to_string(),
            }),
        }
    }

    /// The database/API string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starter => TIER_STARTER,
            Self::Pro => TIER_PRO,
            Self::Business => TIER_BUSINESS,
            Self::Enterprise => TIER_ENTERPRISE,
        }
    }
}

/// Resource limits and price for one plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanLimits {
    pub max_workflows: i64,
    pub max_executions_per_month: i64,
    pub max_content_units_per_week: i64,
    /// Monthly price in whole USD.
    pub price_usd: i64,
}

/// Immutable tier → limits lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanCatalog;

impl PlanCatalog {
    /// Look up the limits for a tier name.
    ///
    /// Fails with [`CoreError::InvalidPlan`] when the name is not one of
    /// the four recognized tiers.
    pub fn limits_for(&self, tier: &str) -> Result<PlanLimits, CoreError> {
        Ok(Self::limits(PlanTier::from_str_value(tier)?))
    }

    /// Limits for an already-parsed tier.
    pub fn limits(tier: PlanTier) -> PlanLimits {
        match tier {
            PlanTier::Starter => PlanLimits {
                max_workflows: 5,
                max_executions_per_month: 10_000,
                max_content_units_per_week: 2,
                price_usd: 49,
            },
            PlanTier::Pro => PlanLimits {
                max_workflows: 25,
                max_executions_per_month: 50_000,
                max_content_units_per_week: 8,
                price_usd: 149,
            },
            PlanTier::Business => PlanLimits {
                max_workflows: UNLIMITED,
                max_executions_per_month: 250_000,
                max_content_units_per_week: 20,
                price_usd: 499,
            },
            PlanTier::Enterprise => PlanLimits {
                max_workflows: UNLIMITED,
                max_executions_per_month: UNLIMITED,
                max_content_units_per_week: UNLIMITED,
                price_usd: 999,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
