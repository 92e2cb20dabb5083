//! Stable reason-code vocabulary.
//!
//! These strings appear in readiness results, snapshot rows, governance
//! events, and HTTP payloads. They are part of the wire contract and must
//! never be renamed once emitted.

/// Employee-level blockers and warnings.
pub mod legitimacy {
    pub const DISCIPLINARY_RESTRICTION: &str = "DISCIPLINARY_RESTRICTION";
    pub const COMPLIANCE_EXPIRED: &str = "COMPLIANCE_EXPIRED";
    pub const COMPLIANCE_EXPIRING: &str = "COMPLIANCE_EXPIRING";
}

/// Policy-state faults that short-circuit aggregation.
pub mod policy {
    pub const NO_SITE: &str = "NO_SITE";
    pub const POLICY_MISSING: &str = "POLICY_MISSING";
    pub const UNIT_MISSING: &str = "UNIT_MISSING";
}

/// Operational staffing diagnostics.
pub mod ops {
    pub const SHIFT_UNSTAFFED: &str = "SHIFT_UNSTAFFED";
    pub const STATION_NO_ELIGIBLE: &str = "STATION_NO_ELIGIBLE";
}

/// Collaborator failures.
pub mod infra {
    pub const QUERY_FAILED: &str = "QUERY_FAILED";
}
