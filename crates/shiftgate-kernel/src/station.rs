//! Station operational readiness: skills versus requirements.
//!
//! Operational readiness is deliberately independent of legality. A station
//! can be fully staffed by employees whose certifications expired yesterday;
//! the legitimacy evaluators catch that, not this module.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A (skill, level) requirement declared on a station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationSkillRequirement {
    pub station_id: String,
    pub skill_code: String,
    pub required_level: u32,
    #[serde(default = "default_mandatory")]
    pub mandatory: bool,
}

fn default_mandatory() -> bool {
    true
}

/// A recorded skill level for one employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeSkillLevel {
    pub employee_id: String,
    pub skill_code: String,
    pub level: u32,
}

/// Operational (non-legal) go/no-go for a station or shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpsStatus {
    #[serde(rename = "OPS_GO")]
    Go,
    #[serde(rename = "OPS_NO_GO")]
    NoGo,
}

/// One named staffing gap: a required skill nobody on the roster covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill_code: String,
    pub required_level: u32,
    pub eligible_count: usize,
}

/// Per-station readiness with diagnostic gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationReadiness {
    pub station_id: String,
    pub status: OpsStatus,
    /// Roster members eligible for the station across all mandatory skills.
    pub eligible_count: usize,
    /// Skills with zero single-skill coverage. Diagnostic only: a station
    /// can report gaps while still being eligible on its other skills.
    pub gaps: Vec<SkillGap>,
}

/// Evaluate one station against a roster.
///
/// Mandatory (skill, level) pairs are deduplicated per skill with the
/// maximum level winning. An employee is eligible only when every mandatory
/// skill is met at or above its level. A station with no requirements at all
/// is ops-ready whenever the roster is non-empty (compatibility shim for
/// unconfigured stations).
pub fn evaluate_station(
    station_id: impl Into<String>,
    requirements: &[StationSkillRequirement],
    roster: &[String],
    levels: &[EmployeeSkillLevel],
) -> StationReadiness {
    let station_id = station_id.into();

    let mut mandatory: BTreeMap<&str, u32> = BTreeMap::new();
    for req in requirements {
        if req.station_id != station_id || !req.mandatory {
            continue;
        }
        mandatory
            .entry(req.skill_code.as_str())
            .and_modify(|level| *level = (*level).max(req.required_level))
            .or_insert(req.required_level);
    }

    let level_of = |employee: &str, skill: &str| -> Option<u32> {
        levels
            .iter()
            .filter(|l| l.employee_id == employee && l.skill_code == skill)
            .map(|l| l.level)
            .max()
    };

    let distinct_roster: BTreeSet<&str> = roster.iter().map(String::as_str).collect();

    if mandatory.is_empty() {
        let status = if distinct_roster.is_empty() {
            OpsStatus::NoGo
        } else {
            OpsStatus::Go
        };
        return StationReadiness {
            station_id,
            status,
            eligible_count: distinct_roster.len(),
            gaps: vec![],
        };
    }

    let eligible_count = distinct_roster
        .iter()
        .filter(|employee| {
            mandatory
                .iter()
                .all(|(skill, required)| level_of(employee, skill).is_some_and(|l| l >= *required))
        })
        .count();

    // Gaps are per-skill, independent of the overall verdict.
    let gaps: Vec<SkillGap> = mandatory
        .iter()
        .filter_map(|(skill, required)| {
            let single_skill_count = distinct_roster
                .iter()
                .filter(|employee| level_of(employee, skill).is_some_and(|l| l >= *required))
                .count();
            (single_skill_count == 0).then(|| SkillGap {
                skill_code: (*skill).to_string(),
                required_level: *required,
                eligible_count: single_skill_count,
            })
        })
        .collect();

    let status = if eligible_count == 0 {
        OpsStatus::NoGo
    } else {
        OpsStatus::Go
    };

    StationReadiness {
        station_id,
        status,
        eligible_count,
        gaps,
    }
}

/// Fold station statuses into a shift-level ops status. Any `NoGo` wins.
pub fn fold_shift_ops(stations: &[StationReadiness]) -> OpsStatus {
    if stations.iter().any(|s| s.status == OpsStatus::NoGo) {
        OpsStatus::NoGo
    } else {
        OpsStatus::Go
    }
}
