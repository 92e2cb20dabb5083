//! Deterministic in-memory queries over a hydrated dataset.
//!
//! Queries are pre-filtered by organization (and site where applicable), the
//! contract the evaluators rely on. Load failures surface as `StoreError`
//! with the stable `QUERY_FAILED` code, never as empty rowsets.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use shiftgate_kernel::compliance::{
    ComplianceRequirement, EmployeeComplianceRecord, RequirementBinding,
};
use shiftgate_kernel::legitimacy::InductionStatus;
use shiftgate_kernel::reason::infra;
use shiftgate_kernel::station::{EmployeeSkillLevel, StationSkillRequirement};

use crate::dataset::Dataset;
use crate::model::{Employee, RosterAssignment, Station, UnitPolicy};

/// Errors raised while loading or querying the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("dataset read failed: {0}")]
    Read(String),

    #[error("dataset parse failed: {0}")]
    Parse(String),

    #[error("employee not found: {0}")]
    EmployeeNotFound(String),
}

impl StoreError {
    /// Stable error code surfaced to callers and audit rows.
    pub fn code(&self) -> &'static str {
        infra::QUERY_FAILED
    }
}

/// Canonical in-memory state for one hydrated dataset.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    dataset: Dataset,
}

impl MemoryStore {
    pub fn from_dataset(dataset: Dataset) -> Self {
        Self { dataset }
    }

    /// Load a dataset from a single JSON document.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let raw = fs::read_to_string(path.as_ref())
            .map_err(|e| StoreError::Read(format!("{}: {e}", path.as_ref().display())))?;
        let dataset: Dataset =
            serde_json::from_str(&raw).map_err(|e| StoreError::Parse(e.to_string()))?;
        Ok(Self::from_dataset(dataset))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Whether the site exists for the org (a site exists when any station,
    /// roster row, or employee references it).
    pub fn site_exists(&self, org_id: &str, site_id: &str) -> bool {
        let station_site = self
            .dataset
            .stations
            .iter()
            .any(|s| s.org_id == org_id && s.site_id == site_id);
        let roster_site = self
            .dataset
            .roster
            .iter()
            .any(|r| r.org_id == org_id && r.site_id == site_id);
        let employee_site = self
            .dataset
            .employees
            .iter()
            .any(|e| e.org_id == org_id && e.site_id.as_deref() == Some(site_id));
        station_site || roster_site || employee_site
    }

    pub fn employee(&self, org_id: &str, employee_id: &str) -> Result<&Employee, StoreError> {
        self.dataset
            .employees
            .iter()
            .find(|e| e.org_id == org_id && e.id == employee_id)
            .ok_or_else(|| StoreError::EmployeeNotFound(employee_id.to_string()))
    }

    pub fn stations_for_site(&self, org_id: &str, site_id: &str) -> Vec<&Station> {
        self.dataset
            .stations
            .iter()
            .filter(|s| s.org_id == org_id && s.site_id == site_id)
            .collect()
    }

    pub fn active_policy_for_unit(&self, unit_id: &str) -> Option<&UnitPolicy> {
        self.dataset
            .unit_policies
            .iter()
            .filter(|p| p.unit_id == unit_id && p.active)
            .max_by_key(|p| p.version)
    }

    pub fn roster(
        &self,
        org_id: &str,
        site_id: &str,
        shift_date: NaiveDate,
        shift_code: &str,
    ) -> Vec<&RosterAssignment> {
        self.dataset
            .roster
            .iter()
            .filter(|r| {
                r.org_id == org_id
                    && r.site_id == site_id
                    && r.shift_date == shift_date
                    && r.shift_code == shift_code
            })
            .collect()
    }

    pub fn requirements_for_org(&self, org_id: &str) -> Vec<ComplianceRequirement> {
        self.dataset
            .requirements
            .iter()
            .filter(|r| r.org_id == org_id)
            .cloned()
            .collect()
    }

    pub fn bindings_for_org(&self, org_id: &str) -> Vec<RequirementBinding> {
        self.dataset
            .bindings
            .iter()
            .filter(|b| b.org_id == org_id)
            .cloned()
            .collect()
    }

    pub fn compliance_records_for_employee(
        &self,
        employee_id: &str,
    ) -> Vec<EmployeeComplianceRecord> {
        self.dataset
            .compliance_records
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect()
    }

    pub fn skill_requirements_for_station(
        &self,
        station_id: &str,
    ) -> Vec<StationSkillRequirement> {
        self.dataset
            .skill_requirements
            .iter()
            .filter(|r| r.station_id == station_id)
            .cloned()
            .collect()
    }

    pub fn skill_levels_for_employees(&self, employee_ids: &[String]) -> Vec<EmployeeSkillLevel> {
        let wanted: BTreeSet<&str> = employee_ids.iter().map(String::as_str).collect();
        self.dataset
            .skill_levels
            .iter()
            .filter(|l| wanted.contains(l.employee_id.as_str()))
            .cloned()
            .collect()
    }

    /// Derive the induction state for one employee at their site.
    ///
    /// Required checkpoints are those scoped to the employee's site plus
    /// org-wide ones. Any required checkpoint without a completion makes the
    /// employee `Restricted`. Recomputed on every call, never stored.
    pub fn induction_status(&self, employee: &Employee) -> InductionStatus {
        let completed: BTreeSet<&str> = self
            .dataset
            .checkpoint_completions
            .iter()
            .filter(|c| c.employee_id == employee.id)
            .map(|c| c.checkpoint_id.as_str())
            .collect();

        let all_done = self
            .dataset
            .induction_checkpoints
            .iter()
            .filter(|cp| {
                cp.org_id == employee.org_id
                    && cp.required
                    && (cp.site_id.is_none() || cp.site_id == employee.site_id)
            })
            .all(|cp| completed.contains(cp.id.as_str()));

        if all_done {
            InductionStatus::Cleared
        } else {
            InductionStatus::Restricted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CheckpointCompletion, InductionCheckpoint};

    fn employee(id: &str, site: Option<&str>) -> Employee {
        Employee {
            id: id.to_string(),
            org_id: "org-1".to_string(),
            site_id: site.map(String::from),
            station_id: None,
            roles: vec![],
            disciplinary_restriction: false,
            active: true,
        }
    }

    fn checkpoint(id: &str, site: Option<&str>, required: bool) -> InductionCheckpoint {
        InductionCheckpoint {
            id: id.to_string(),
            org_id: "org-1".to_string(),
            site_id: site.map(String::from),
            required,
        }
    }

    fn completion(checkpoint: &str, employee: &str) -> CheckpointCompletion {
        CheckpointCompletion {
            checkpoint_id: checkpoint.to_string(),
            employee_id: employee.to_string(),
        }
    }

    #[test]
    fn induction_requires_all_required_checkpoints() {
        let dataset = Dataset {
            employees: vec![employee("e1", Some("site-1"))],
            induction_checkpoints: vec![
                checkpoint("cp-org", None, true),
                checkpoint("cp-site", Some("site-1"), true),
                checkpoint("cp-optional", Some("site-1"), false),
            ],
            checkpoint_completions: vec![completion("cp-org", "e1")],
            ..Dataset::default()
        };
        let store = MemoryStore::from_dataset(dataset);
        let emp = store.employee("org-1", "e1").expect("employee exists");

        assert_eq!(store.induction_status(emp), InductionStatus::Restricted);
    }

    #[test]
    fn induction_cleared_ignores_other_sites_and_optional() {
        let dataset = Dataset {
            employees: vec![employee("e1", Some("site-1"))],
            induction_checkpoints: vec![
                checkpoint("cp-org", None, true),
                checkpoint("cp-elsewhere", Some("site-2"), true),
                checkpoint("cp-optional", Some("site-1"), false),
            ],
            checkpoint_completions: vec![completion("cp-org", "e1")],
            ..Dataset::default()
        };
        let store = MemoryStore::from_dataset(dataset);
        let emp = store.employee("org-1", "e1").expect("employee exists");

        assert_eq!(store.induction_status(emp), InductionStatus::Cleared);
    }

    #[test]
    fn active_policy_picks_highest_active_version() {
        let dataset = Dataset {
            unit_policies: vec![
                UnitPolicy {
                    unit_id: "u1".to_string(),
                    policy_id: "p1".to_string(),
                    version: 3,
                    active: false,
                },
                UnitPolicy {
                    unit_id: "u1".to_string(),
                    policy_id: "p1".to_string(),
                    version: 2,
                    active: true,
                },
                UnitPolicy {
                    unit_id: "u1".to_string(),
                    policy_id: "p1".to_string(),
                    version: 1,
                    active: true,
                },
            ],
            ..Dataset::default()
        };
        let store = MemoryStore::from_dataset(dataset);
        let policy = store.active_policy_for_unit("u1").expect("active policy");
        assert_eq!(policy.version, 2);
    }

    #[test]
    fn missing_dataset_file_is_a_query_failure() {
        let err = MemoryStore::load_json("/nonexistent/dataset.json").expect_err("read fails");
        assert_eq!(err.code(), "QUERY_FAILED");
    }
}
