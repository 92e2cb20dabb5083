//! End-to-end flow over one staffed welding shift: evaluate, issue and
//! verify an execution token, freeze the snapshot, verify the chain, and
//! pass the same context through the governance gate.

use chrono::{NaiveDate, Utc};
use shiftgate_engine::{
    CockpitAggregator, GateAction, GovernanceGate, LegalStatus, ReadinessContext, ReadinessStatus,
    TokenService, freeze_snapshot, verify_chain,
};
use shiftgate_kernel::station::{EmployeeSkillLevel, StationSkillRequirement};
use shiftgate_store::{
    Dataset, Employee, LedgerStore, MemoryStore, RosterAssignment, Station, Unit, UnitPolicy,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn ctx() -> ReadinessContext {
    ReadinessContext {
        org_id: "org-1".to_string(),
        site_id: "site-1".to_string(),
        shift_code: "EARLY".to_string(),
        shift_date: day(2026, 8, 25),
    }
}

fn employee(id: &str) -> Employee {
    Employee {
        id: id.to_string(),
        org_id: "org-1".to_string(),
        site_id: Some("site-1".to_string()),
        station_id: None,
        roles: vec![],
        disciplinary_restriction: false,
        active: true,
    }
}

fn skill(employee_id: &str, level: u32) -> EmployeeSkillLevel {
    EmployeeSkillLevel {
        employee_id: employee_id.to_string(),
        skill_code: "WELD".to_string(),
        level,
    }
}

fn rostered(id: &str) -> RosterAssignment {
    RosterAssignment {
        org_id: "org-1".to_string(),
        site_id: "site-1".to_string(),
        shift_date: day(2026, 8, 25),
        shift_code: "EARLY".to_string(),
        employee_id: id.to_string(),
        station_id: Some("st-weld".to_string()),
    }
}

fn weld_dataset() -> Dataset {
    Dataset {
        employees: vec![employee("e2"), employee("e3"), employee("e4")],
        stations: vec![Station {
            id: "st-weld".to_string(),
            org_id: "org-1".to_string(),
            site_id: "site-1".to_string(),
            name: "Welding".to_string(),
            unit_id: Some("u-fab".to_string()),
        }],
        units: vec![Unit {
            id: "u-fab".to_string(),
            org_id: "org-1".to_string(),
            name: "Fabrication".to_string(),
        }],
        unit_policies: vec![UnitPolicy {
            unit_id: "u-fab".to_string(),
            policy_id: "pol-fab".to_string(),
            version: 2,
            active: true,
        }],
        skill_requirements: vec![StationSkillRequirement {
            station_id: "st-weld".to_string(),
            skill_code: "WELD".to_string(),
            required_level: 3,
            mandatory: true,
        }],
        skill_levels: vec![skill("e2", 2), skill("e3", 3), skill("e4", 4)],
        roster: vec![rostered("e2"), rostered("e3"), rostered("e4")],
        ..Dataset::default()
    }
}

#[test]
fn staffed_weld_shift_goes_end_to_end() {
    let store = MemoryStore::from_dataset(weld_dataset());
    let mut ledger = LedgerStore::default();
    let now = Utc::now();
    let ctx = ctx();

    // Two of three rostered welders meet WELD level 3.
    let result = CockpitAggregator::new(&store)
        .evaluate(&ctx, now)
        .expect("evaluate");
    assert_eq!(result.status, ReadinessStatus::Go);
    assert_eq!(result.legitimacy_status, LegalStatus::Ok);
    assert_eq!(result.readiness_score, 100);
    assert!(result.blocking_stations.is_empty());
    assert_eq!(result.policy.units.len(), 1);
    assert_eq!(result.policy.units[0].version, 2);

    let tokens = TokenService::new(Some("an-adequately-long-secret".to_string()), 300_000);
    let blob = tokens
        .issue(&ctx, &result, &["roster.publish".to_string()], now)
        .expect("issue")
        .expect("actionable result gets a token");
    let claims = tokens.verify(&blob, now).expect("verify");
    assert_eq!(claims.readiness_status, ReadinessStatus::Go);
    assert_eq!(claims.site_id, "site-1");

    let row = freeze_snapshot(&mut ledger, &ctx, &result, now).expect("freeze");
    assert_eq!(row.chain_position, 1);
    assert!(row.previous_hash.is_empty());
    assert_eq!(row.payload_hash_algo, "v2");

    let report = verify_chain(&ledger, "org-1");
    assert!(report.chain_valid);
    assert_eq!(report.total_snapshots, 1);

    let decision = GovernanceGate::new(&store)
        .guard(
            &mut ledger,
            "supervisor",
            &GateAction {
                name: "roster.publish".to_string(),
                target: "site-1/EARLY".to_string(),
                shift_scoped: true,
            },
            &ctx,
            None,
            now,
        )
        .expect("guard");
    assert!(decision.allowed());
    assert_eq!(ledger.events_for_org("org-1").len(), 1);
}

#[test]
fn understaffed_station_blocks_the_whole_flow() {
    let mut data = weld_dataset();
    // Only sub-level welders remain.
    data.skill_levels = vec![skill("e2", 1), skill("e3", 2)];
    data.roster.pop();
    let store = MemoryStore::from_dataset(data);
    let mut ledger = LedgerStore::default();
    let now = Utc::now();
    let ctx = ctx();

    let result = CockpitAggregator::new(&store)
        .evaluate(&ctx, now)
        .expect("evaluate");
    assert_eq!(result.status, ReadinessStatus::NoGo);
    assert_eq!(result.blocking_stations, vec!["st-weld".to_string()]);
    assert!(result.reason_codes.contains(&"STATION_NO_ELIGIBLE".to_string()));

    let tokens = TokenService::new(Some("an-adequately-long-secret".to_string()), 300_000);
    let blob = tokens
        .issue(&ctx, &result, &[], now)
        .expect("issue");
    assert!(blob.is_none(), "no token for a NO_GO shift");

    // The freeze still records the NO_GO for the audit trail.
    let row = freeze_snapshot(&mut ledger, &ctx, &result, now).expect("freeze");
    assert_eq!(row.readiness_status, "NO_GO");
    assert!(verify_chain(&ledger, "org-1").chain_valid);

    let decision = GovernanceGate::new(&store)
        .guard(
            &mut ledger,
            "supervisor",
            &GateAction {
                name: "roster.publish".to_string(),
                target: "site-1/EARLY".to_string(),
                shift_scoped: true,
            },
            &ctx,
            None,
            now,
        )
        .expect("guard");
    assert!(!decision.allowed());
    assert_eq!(ledger.events_for_org("org-1")[0].outcome, "BLOCKED");
}
