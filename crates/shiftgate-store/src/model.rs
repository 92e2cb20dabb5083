//! Org-scoped row types consumed by the readiness engine.
//!
//! Kernel-owned rows (`ComplianceRequirement`, `RequirementBinding`,
//! `EmployeeComplianceRecord`, skill rows) live in `shiftgate-kernel`; this
//! module holds the remaining tables the aggregator reads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An employee as the engine sees one. Membership management is external;
/// the engine only reads these rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub org_id: String,
    #[serde(default)]
    pub site_id: Option<String>,
    /// Currently assigned station, when any.
    #[serde(default)]
    pub station_id: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub disciplinary_restriction: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// A physical work station at a site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub org_id: String,
    pub site_id: String,
    pub name: String,
    /// Operational unit the station belongs to. A station without a unit
    /// short-circuits readiness with `UNIT_MISSING`.
    #[serde(default)]
    pub unit_id: Option<String>,
}

/// An operational unit grouping stations under one policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub org_id: String,
    pub name: String,
}

/// A unit-to-policy association. Only active rows count; a unit without an
/// active policy short-circuits readiness with `POLICY_MISSING`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitPolicy {
    pub unit_id: String,
    pub policy_id: String,
    pub version: u32,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// One rostered (employee, shift) membership. Proposed by external
/// scheduling; the engine only judges it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterAssignment {
    pub org_id: String,
    pub site_id: String,
    pub shift_date: NaiveDate,
    pub shift_code: String,
    pub employee_id: String,
    #[serde(default)]
    pub station_id: Option<String>,
}

/// A site induction checkpoint. `site_id: None` means org-wide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InductionCheckpoint {
    pub id: String,
    pub org_id: String,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default = "default_true")]
    pub required: bool,
}

/// A completed checkpoint for one employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointCompletion {
    pub checkpoint_id: String,
    pub employee_id: String,
}
