use chrono::Utc;
use std::process;

use shiftgate_engine::{GateAction, GovernanceGate, ReadinessContext};

use crate::support::{load_ledger, load_store, parse_date, print_json, save_ledger};

#[allow(clippy::too_many_arguments)]
pub fn run(
    action: String,
    target: Option<String>,
    actor: String,
    org: String,
    site: String,
    shift: Option<String>,
    date: Option<String>,
    data: String,
    ledger_path: String,
    json: bool,
) {
    // A shift-scoped action needs both the shift code and the date.
    let shift_scoped = match (&shift, &date) {
        (Some(_), Some(_)) => true,
        (None, None) => false,
        _ => {
            eprintln!("error: --shift and --date must be given together");
            process::exit(1);
        }
    };

    let store = load_store(&data);
    let mut ledger = load_ledger(&ledger_path);

    let shift_code = shift.unwrap_or_default();
    let ctx = ReadinessContext {
        org_id: org,
        site_id: site,
        shift_code: shift_code.clone(),
        shift_date: date
            .as_deref()
            .map(parse_date)
            .unwrap_or_default(),
    };
    let gate_action = GateAction {
        target: target.unwrap_or_else(|| {
            if shift_scoped {
                format!("{}/{shift_code}", ctx.site_id)
            } else {
                ctx.org_id.clone()
            }
        }),
        name: action,
        shift_scoped,
    };

    let decision = GovernanceGate::new(&store)
        .guard(&mut ledger, &actor, &gate_action, &ctx, None, Utc::now())
        .unwrap_or_else(|e| {
            eprintln!("error: gate evaluation failed: {e}");
            process::exit(1);
        });
    save_ledger(&ledger, &ledger_path);

    if json {
        print_json(&decision);
    } else {
        println!(
            "{} {} on {}",
            if decision.allowed() { "ALLOWED" } else { "BLOCKED" },
            gate_action.name,
            gate_action.target
        );
        if !decision.reason_codes.is_empty() {
            println!("  reasons: {}", decision.reason_codes.join(", "));
        }
        println!("  event: {}", decision.event_id);
    }

    if !decision.allowed() {
        process::exit(1);
    }
}
