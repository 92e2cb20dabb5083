//! The full org dataset as one JSON document.
//!
//! The engine's collaborator contract is rowsets pre-filtered by the caller;
//! for the CLI and tests those rowsets hydrate from a single `Dataset` file.

use serde::{Deserialize, Serialize};
use shiftgate_kernel::compliance::{
    ComplianceRequirement, EmployeeComplianceRecord, RequirementBinding,
};
use shiftgate_kernel::station::{EmployeeSkillLevel, StationSkillRequirement};

use crate::model::{
    CheckpointCompletion, Employee, InductionCheckpoint, RosterAssignment, Station, Unit,
    UnitPolicy,
};

/// Every rowset the readiness engine reads, in one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub requirements: Vec<ComplianceRequirement>,
    #[serde(default)]
    pub bindings: Vec<RequirementBinding>,
    #[serde(default)]
    pub compliance_records: Vec<EmployeeComplianceRecord>,
    #[serde(default)]
    pub induction_checkpoints: Vec<InductionCheckpoint>,
    #[serde(default)]
    pub checkpoint_completions: Vec<CheckpointCompletion>,
    #[serde(default)]
    pub stations: Vec<Station>,
    #[serde(default)]
    pub skill_requirements: Vec<StationSkillRequirement>,
    #[serde(default)]
    pub skill_levels: Vec<EmployeeSkillLevel>,
    #[serde(default)]
    pub roster: Vec<RosterAssignment>,
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub unit_policies: Vec<UnitPolicy>,
}
