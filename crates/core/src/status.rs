//! Tenant lifecycle state machine.
//!
//! `provisioning → active`, `active ↔ suspended`,
//! `(active | suspended) → deleted`. `deleted` is terminal.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const STATUS_PROVISIONING: &str = "provisioning";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_SUSPENDED: &str = "suspended";
pub const STATUS_DELETED: &str = "deleted";

/// All valid tenant status strings, as stored in the `status` column.
pub const VALID_TENANT_STATUSES: &[&str] = &[
    STATUS_PROVISIONING,
    STATUS_ACTIVE,
    STATUS_SUSPENDED,
    STATUS_DELETED,
];

// ---------------------------------------------------------------------------
// Enum
// ---------------------------------------------------------------------------

/// Lifecycle status of a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    Provisioning,
    Active,
    Suspended,
    Deleted,
}

impl TenantStatus {
    /// Parse from the database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_PROVISIONING => Ok(Self::Provisioning),
            STATUS_ACTIVE => Ok(Self::Active),
            STATUS_SUSPENDED => Ok(Self::Suspended),
            STATUS_DELETED => Ok(Self::Deleted),
            _ => Err(format!(
                "Invalid tenant status '{s}'. Must be one of: {}",
                VALID_TENANT_STATUSES.join(", ")
            )),
        }
    }

    /// The database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provisioning => STATUS_PROVISIONING,
            Self::Active => STATUS_ACTIVE,
            Self::Suspended => STATUS_SUSPENDED,
            Self::Deleted => STATUS_DELETED,
        }
    }

    /// Whether the state machine permits moving from `self` to `next`.
    ///
    /// Transitions are monotonic except `active ↔ suspended`; `deleted`
    /// is terminal.
    pub fn can_transition_to(&self, next: TenantStatus) -> bool {
        use TenantStatus::*;
        matches!(
            (self, next),
            (Provisioning, Active)
                | (Active, Suspended)
                | (Suspended, Active)
                | (Active, Deleted)
                | (Suspended, Deleted)
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use TenantStatus::*;

    #[test]
    fn from_str_round_trip() {
        for s in VALID_TENANT_STATUSES {
            assert_eq!(TenantStatus::from_str_value(s).unwrap().as_str(), *s);
        }
    }

    #[test]
    fn unknown_status_rejected() {
        let err = TenantStatus::from_str_value("paused").unwrap_err();
        assert!(err.contains("Invalid tenant status"));
    }

    #[test]
    fn provisioning_activates() {
        assert!(Provisioning.can_transition_to(Active));
    }

    #[test]
    fn active_and_suspended_swap_both_ways() {
        assert!(Active.can_transition_to(Suspended));
        assert!(Suspended.can_transition_to(Active));
    }

    #[test]
    fn live_states_can_delete() {
        assert!(Active.can_transition_to(Deleted));
        assert!(Suspended.can_transition_to(Deleted));
    }

    #[test]
    fn deleted_is_terminal() {
        for next in [Provisioning, Active, Suspended, Deleted] {
            assert!(!Deleted.can_transition_to(next));
        }
    }

    #[test]
    fn no_backward_transitions() {
        assert!(!Active.can_transition_to(Provisioning));
        assert!(!Suspended.can_transition_to(Provisioning));
        // Provisioning cannot be deleted or suspended mid-flight.
        assert!(!Provisioning.can_transition_to(Deleted));
        assert!(!Provisioning.can_transition_to(Suspended));
    }

    #[test]
    fn self_transitions_rejected() {
        for s in [Provisioning, Active, Suspended, Deleted] {
            assert!(!s.can_transition_to(s));
        }
    }

    #[test]
    fn status_list_complete() {
        assert_eq!(VALID_TENANT_STATUSES.len(), 4);
    }
}
