//! The Cockpit Readiness Aggregator.
//!
//! One call computes the complete readiness picture for an (org, site,
//! shift): policy envelope resolution, per-employee legitimacy, shift fold,
//! station ops readiness, combined status, score, and grade.
//!
//! Policy-state checks run before any compliance or ops evaluation. A
//! station without a unit or a unit without an active policy invalidates
//! the whole computation regardless of individual employee state, so the
//! aggregator short-circuits to a legal stop with `UNIT_MISSING` /
//! `POLICY_MISSING` and never touches the roster.
//!
//! Context is always an explicit parameter. There is no ambient
//! "current org/site" anywhere in the engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use shiftgate_kernel::compliance::{EmployeeScope, resolve_employee_compliance};
use shiftgate_kernel::legitimacy::{
    EmployeeVerdict, LegitimacyStatus, evaluate_employee, evaluate_shift,
};
use shiftgate_kernel::reason::{ops, policy as policy_reason};
use shiftgate_kernel::station::{OpsStatus, evaluate_station, fold_shift_ops};
use shiftgate_store::MemoryStore;

use crate::error::EngineError;
use crate::policy::{CompliancePolicyRef, PolicyEnvelope, UnitPolicyRef};

/// How many employee blockers a result samples for audit rows.
const SAMPLED_BLOCKER_LIMIT: usize = 5;

/// Score ceiling when the shift carries compliance warnings.
const WARNING_SCORE_CAP: u32 = 85;

/// Identifies one readiness computation. Threaded explicitly through every
/// engine call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessContext {
    pub org_id: String,
    pub site_id: String,
    pub shift_code: String,
    pub shift_date: NaiveDate,
}

/// Combined operational + legal readiness verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessStatus {
    #[serde(rename = "GO")]
    Go,
    #[serde(rename = "WARNING")]
    Warning,
    #[serde(rename = "NO_GO")]
    NoGo,
}

/// Whether the computation is legally actionable at all.
///
/// `LegalStop` covers both an illegal shift and an invalid policy state;
/// warnings stay `Ok` so that warned-but-legal work remains actionable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegalStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "LEGAL_STOP")]
    LegalStop,
}

/// Full aggregator output. Not persisted by itself; the ledger freezes a
/// projection of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResult {
    pub readiness_score: u32,
    pub status: ReadinessStatus,
    pub legitimacy_status: LegalStatus,
    pub grade: String,
    pub blocking_stations: Vec<String>,
    pub reason_codes: Vec<String>,
    pub roster_count: usize,
    /// Up to [`SAMPLED_BLOCKER_LIMIT`] `employee:code` pairs for audit rows.
    pub sampled_blockers: Vec<String>,
    pub calculated_at: DateTime<Utc>,
    pub policy: PolicyEnvelope,
}

impl ReadinessResult {
    /// Whether a mutating action may proceed under this result.
    pub fn is_actionable(&self) -> bool {
        self.legitimacy_status == LegalStatus::Ok && self.status != ReadinessStatus::NoGo
    }
}

/// Orchestrates kernel evaluators against live store data.
pub struct CockpitAggregator<'a> {
    store: &'a MemoryStore,
}

impl<'a> CockpitAggregator<'a> {
    pub fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    /// Complete readiness computation for one shift context.
    pub fn evaluate(
        &self,
        ctx: &ReadinessContext,
        now: DateTime<Utc>,
    ) -> Result<ReadinessResult, EngineError> {
        let (envelope, policy_faults, faulted_stations) = self.resolve_policy(ctx);

        if !policy_faults.is_empty() {
            return Ok(legal_stop_result(
                envelope,
                policy_faults,
                faulted_stations,
                0,
                now,
            ));
        }

        let roster = self
            .store
            .roster(&ctx.org_id, &ctx.site_id, ctx.shift_date, &ctx.shift_code);
        let roster_count = roster.len();
        let roster_ids: Vec<String> = roster.iter().map(|r| r.employee_id.clone()).collect();

        let mut reason_codes: BTreeSet<String> = BTreeSet::new();
        if roster.is_empty() {
            reason_codes.insert(ops::SHIFT_UNSTAFFED.to_string());
        }

        // Legal side: per-employee verdicts folded to a shift verdict.
        let catalog = self.store.requirements_for_org(&ctx.org_id);
        let bindings = self.store.bindings_for_org(&ctx.org_id);
        let mut verdicts: Vec<EmployeeVerdict> = Vec::with_capacity(roster.len());
        let mut sampled_blockers = Vec::new();

        for assignment in &roster {
            let employee = self.store.employee(&ctx.org_id, &assignment.employee_id)?;
            let records = self.store.compliance_records_for_employee(&employee.id);
            let station_id = assignment
                .station_id
                .as_deref()
                .or(employee.station_id.as_deref());
            let scope = EmployeeScope {
                employee_id: &employee.id,
                site_id: employee.site_id.as_deref(),
                station_id,
                roles: &employee.roles,
            };
            let cells =
                resolve_employee_compliance(&catalog, &bindings, &records, &scope, ctx.shift_date);
            let verdict = evaluate_employee(
                employee.id.clone(),
                self.store.induction_status(employee),
                employee.disciplinary_restriction,
                &cells,
            );

            for code in verdict.blockers.iter().chain(verdict.warnings.iter()) {
                reason_codes.insert(code.clone());
                if sampled_blockers.len() < SAMPLED_BLOCKER_LIMIT {
                    sampled_blockers.push(format!("{}:{code}", verdict.employee_id));
                }
            }
            verdicts.push(verdict);
        }

        let shift = evaluate_shift(&verdicts);

        // Operational side: station-by-station skills coverage.
        let stations = self.store.stations_for_site(&ctx.org_id, &ctx.site_id);
        let levels = self.store.skill_levels_for_employees(&roster_ids);
        let mut station_results = Vec::with_capacity(stations.len());
        for station in &stations {
            let requirements = self.store.skill_requirements_for_station(&station.id);
            station_results.push(evaluate_station(
                station.id.clone(),
                &requirements,
                &roster_ids,
                &levels,
            ));
        }
        let ops_status = fold_shift_ops(&station_results);
        let blocking_stations: Vec<String> = station_results
            .iter()
            .filter(|s| s.status == OpsStatus::NoGo)
            .map(|s| s.station_id.clone())
            .collect();
        if !blocking_stations.is_empty() {
            reason_codes.insert(ops::STATION_NO_ELIGIBLE.to_string());
        }

        let legitimacy_status = if shift.status == LegitimacyStatus::Illegal {
            LegalStatus::LegalStop
        } else {
            LegalStatus::Ok
        };
        let status = if legitimacy_status == LegalStatus::LegalStop
            || ops_status == OpsStatus::NoGo
        {
            ReadinessStatus::NoGo
        } else if shift.status == LegitimacyStatus::Warning {
            ReadinessStatus::Warning
        } else {
            ReadinessStatus::Go
        };

        let readiness_score = score(status, shift.status, &station_results);

        Ok(ReadinessResult {
            readiness_score,
            status,
            legitimacy_status,
            grade: grade(readiness_score).to_string(),
            blocking_stations,
            reason_codes: reason_codes.into_iter().collect(),
            roster_count,
            sampled_blockers,
            calculated_at: now,
            policy: envelope,
        })
    }

    /// Lighter org-only variant: site and policy checks without any roster
    /// evaluation. Used by the gate for actions outside a shift context.
    pub fn evaluate_org(
        &self,
        ctx: &ReadinessContext,
        now: DateTime<Utc>,
    ) -> Result<ReadinessResult, EngineError> {
        let (envelope, policy_faults, faulted_stations) = self.resolve_policy(ctx);

        if !policy_faults.is_empty() {
            return Ok(legal_stop_result(
                envelope,
                policy_faults,
                faulted_stations,
                0,
                now,
            ));
        }

        Ok(ReadinessResult {
            readiness_score: 100,
            status: ReadinessStatus::Go,
            legitimacy_status: LegalStatus::Ok,
            grade: grade(100).to_string(),
            blocking_stations: vec![],
            reason_codes: vec![],
            roster_count: 0,
            sampled_blockers: vec![],
            calculated_at: now,
            policy: envelope,
        })
    }

    /// Resolve the policy envelope and any short-circuiting faults.
    fn resolve_policy(
        &self,
        ctx: &ReadinessContext,
    ) -> (PolicyEnvelope, BTreeSet<String>, Vec<String>) {
        let compliance = CompliancePolicyRef {
            requirement_count: self.store.requirements_for_org(&ctx.org_id).len(),
            binding_count: self.store.bindings_for_org(&ctx.org_id).len(),
        };

        let mut faults = BTreeSet::new();
        let mut faulted_stations = Vec::new();
        let mut units: Vec<UnitPolicyRef> = Vec::new();
        let mut seen_units = BTreeSet::new();

        if !self.store.site_exists(&ctx.org_id, &ctx.site_id) {
            faults.insert(policy_reason::NO_SITE.to_string());
            return (PolicyEnvelope::new(units, compliance), faults, faulted_stations);
        }

        for station in self.store.stations_for_site(&ctx.org_id, &ctx.site_id) {
            let Some(unit_id) = station.unit_id.as_deref() else {
                faults.insert(policy_reason::UNIT_MISSING.to_string());
                faulted_stations.push(station.id.clone());
                continue;
            };
            match self.store.active_policy_for_unit(unit_id) {
                Some(policy) => {
                    if seen_units.insert(unit_id.to_string()) {
                        units.push(UnitPolicyRef {
                            unit_id: unit_id.to_string(),
                            policy_id: policy.policy_id.clone(),
                            version: policy.version,
                        });
                    }
                }
                None => {
                    faults.insert(policy_reason::POLICY_MISSING.to_string());
                    faulted_stations.push(station.id.clone());
                }
            }
        }

        (PolicyEnvelope::new(units, compliance), faults, faulted_stations)
    }
}

fn legal_stop_result(
    envelope: PolicyEnvelope,
    faults: BTreeSet<String>,
    blocking_stations: Vec<String>,
    roster_count: usize,
    now: DateTime<Utc>,
) -> ReadinessResult {
    ReadinessResult {
        readiness_score: 0,
        status: ReadinessStatus::NoGo,
        legitimacy_status: LegalStatus::LegalStop,
        grade: grade(0).to_string(),
        blocking_stations,
        reason_codes: faults.into_iter().collect(),
        roster_count,
        sampled_blockers: vec![],
        calculated_at: now,
        policy: envelope,
    }
}

/// Numeric readiness index. Base is the share of ops-ready stations (100
/// when the site declares none); shift warnings cap it; any no-go zeroes it.
fn score(
    status: ReadinessStatus,
    shift_status: LegitimacyStatus,
    stations: &[shiftgate_kernel::station::StationReadiness],
) -> u32 {
    if status == ReadinessStatus::NoGo {
        return 0;
    }

    let base = if stations.is_empty() {
        100
    } else {
        let ready = stations
            .iter()
            .filter(|s| s.status == OpsStatus::Go)
            .count();
        ((ready * 100) / stations.len()) as u32
    };

    if shift_status == LegitimacyStatus::Warning {
        base.min(WARNING_SCORE_CAP)
    } else {
        base
    }
}

/// Letter grade bands over the numeric index.
fn grade(score: u32) -> &'static str {
    match score {
        90..=100 => "A",
        75..=89 => "B",
        60..=74 => "C",
        40..=59 => "D",
        _ => "F",
    }
}
