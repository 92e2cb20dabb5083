//! Compliance requirement resolution for one employee.
//!
//! Requirements reach an employee through scoped bindings. Three scopes can
//! bind the same requirement code; the most specific one decides the warning
//! window. Precedence is STATION > ROLE > ORG, expressed as a tagged merge
//! over a map keyed by requirement code: lower-precedence scopes are applied
//! first so higher ones overwrite rather than append.
//!
//! When the organization has no bindings at all, every active catalog
//! requirement is evaluated with its default window. This is a
//! backward-compatibility shim kept deliberately in one place.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::expiry::{ExpiryStatus, evaluate_expiry};

/// A catalog compliance requirement owned by an organization.
///
/// Immutable once referenced by historical evaluations; retired entries are
/// soft-deactivated via `active`, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceRequirement {
    pub id: String,
    pub org_id: String,
    pub code: String,
    pub name: String,
    pub default_warning_window_days: u32,
    pub active: bool,
}

/// Granularity at which a binding attaches a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BindingScope {
    Org,
    Role,
    Station,
}

/// A scoped association of a requirement code with a warning-window override.
///
/// Authored by administrators; read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementBinding {
    pub org_id: String,
    pub requirement_code: String,
    pub scope: BindingScope,
    #[serde(default)]
    pub role_code: Option<String>,
    #[serde(default)]
    pub station_id: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub warning_window_days_override: Option<u32>,
}

/// One validity window for (employee, requirement).
///
/// Never deleted; superseded by rows with later windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeComplianceRecord {
    pub employee_id: String,
    pub requirement_code: String,
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
    #[serde(default)]
    pub waived: bool,
    #[serde(default)]
    pub evidence_ref: Option<String>,
}

/// Where the employee sits for binding applicability.
#[derive(Debug, Clone)]
pub struct EmployeeScope<'a> {
    pub employee_id: &'a str,
    pub site_id: Option<&'a str>,
    pub station_id: Option<&'a str>,
    pub roles: &'a [String],
}

/// Status of one resolved requirement cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceCellStatus {
    Valid,
    Warning,
    Illegal,
    Waived,
    Missing,
}

/// One row of the employee's resolved compliance matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceCell {
    pub requirement_code: String,
    pub requirement_name: String,
    pub status: ComplianceCellStatus,
    /// Window that was actually applied (override or catalog default).
    pub warning_window_days: u32,
    /// Scope that decided the window, absent in catalog-fallback mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<BindingScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<NaiveDate>,
}

/// Resolve the applicable requirements for one employee and evaluate each.
///
/// `bindings` must already be filtered to the employee's organization by the
/// caller; this function further narrows them by site, role, and station.
/// Returns one cell per applicable requirement, ordered by requirement code.
pub fn resolve_employee_compliance(
    catalog: &[ComplianceRequirement],
    bindings: &[RequirementBinding],
    records: &[EmployeeComplianceRecord],
    scope: &EmployeeScope<'_>,
    reference: NaiveDate,
) -> Vec<ComplianceCell> {
    let catalog_by_code: BTreeMap<&str, &ComplianceRequirement> = catalog
        .iter()
        .filter(|req| req.active)
        .map(|req| (req.code.as_str(), req))
        .collect();

    // (window, deciding scope) per requirement code. Applying ORG, then
    // ROLE, then STATION lets the most specific scope overwrite.
    let mut applicable: BTreeMap<&str, (u32, Option<BindingScope>)> = BTreeMap::new();

    if bindings.is_empty() {
        // Catalog-fallback mode: no bindings configured for the org at all.
        for (code, req) in &catalog_by_code {
            applicable.insert(code, (req.default_warning_window_days, None));
        }
    } else {
        for pass in [BindingScope::Org, BindingScope::Role, BindingScope::Station] {
            for binding in bindings {
                if binding.scope != pass || !binding_applies(binding, scope) {
                    continue;
                }
                let Some(req) = catalog_by_code.get(binding.requirement_code.as_str()) else {
                    // Binding to a retired or unknown code contributes nothing.
                    continue;
                };
                let window = binding
                    .warning_window_days_override
                    .unwrap_or(req.default_warning_window_days);
                applicable.insert(&req.code, (window, Some(pass)));
            }
        }
    }

    applicable
        .into_iter()
        .map(|(code, (window, decided_by))| {
            let req = catalog_by_code[code];
            evaluate_cell(req, window, decided_by, records, scope.employee_id, reference)
        })
        .collect()
}

fn binding_applies(binding: &RequirementBinding, scope: &EmployeeScope<'_>) -> bool {
    if let Some(site) = binding.site_id.as_deref()
        && scope.site_id != Some(site)
    {
        return false;
    }

    match binding.scope {
        BindingScope::Org => true,
        BindingScope::Role => binding
            .role_code
            .as_deref()
            .is_some_and(|role| scope.roles.iter().any(|held| held == role)),
        BindingScope::Station => {
            binding.station_id.as_deref().is_some() && binding.station_id.as_deref() == scope.station_id
        }
    }
}

fn evaluate_cell(
    req: &ComplianceRequirement,
    window: u32,
    decided_by: Option<BindingScope>,
    records: &[EmployeeComplianceRecord],
    employee_id: &str,
    reference: NaiveDate,
) -> ComplianceCell {
    let record = current_record(records, employee_id, &req.code);

    let (status, expires_on) = match record {
        None => (ComplianceCellStatus::Missing, None),
        Some(record) if record.waived => (ComplianceCellStatus::Waived, record.valid_to),
        Some(record) => {
            let status = match evaluate_expiry(record.valid_to, window, reference) {
                ExpiryStatus::Valid => ComplianceCellStatus::Valid,
                ExpiryStatus::Warning => ComplianceCellStatus::Warning,
                ExpiryStatus::Illegal => ComplianceCellStatus::Illegal,
            };
            (status, record.valid_to)
        }
    };

    ComplianceCell {
        requirement_code: req.code.clone(),
        requirement_name: req.name.clone(),
        status,
        warning_window_days: window,
        decided_by,
        expires_on,
    }
}

/// Pick the governing record: the one with the latest validity end, an
/// open-ended window (`valid_to: None`) beating any dated one.
fn current_record<'a>(
    records: &'a [EmployeeComplianceRecord],
    employee_id: &str,
    code: &str,
) -> Option<&'a EmployeeComplianceRecord> {
    records
        .iter()
        .filter(|r| r.employee_id == employee_id && r.requirement_code == code)
        .max_by_key(|r| match r.valid_to {
            None => (1, NaiveDate::MAX),
            Some(date) => (0, date),
        })
}
