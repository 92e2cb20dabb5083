use chrono::Utc;
use std::process;

use shiftgate_engine::{CockpitAggregator, freeze_snapshot};

use crate::support::{context, load_ledger, load_store, print_json, save_ledger};

pub fn run(
    org: String,
    site: String,
    shift: String,
    date: String,
    data: String,
    ledger_path: String,
    json: bool,
) {
    let store = load_store(&data);
    let mut ledger = load_ledger(&ledger_path);
    let ctx = context(org, site, shift, &date);
    let now = Utc::now();

    let result = CockpitAggregator::new(&store)
        .evaluate(&ctx, now)
        .unwrap_or_else(|e| {
            eprintln!("error: readiness evaluation failed: {e}");
            process::exit(1);
        });

    let row = freeze_snapshot(&mut ledger, &ctx, &result, now).unwrap_or_else(|e| {
        eprintln!("error: freeze failed: {e}");
        process::exit(1);
    });
    save_ledger(&ledger, &ledger_path);

    if json {
        print_json(&row);
        return;
    }

    println!("frozen snapshot {}", row.id);
    println!("  chain position: {}", row.chain_position);
    println!("  status: {} / {}", row.readiness_status, row.legitimacy_status);
    println!("  score: {} (grade {})", row.readiness_score, row.grade);
    println!("  payload hash ({}): {}", row.payload_hash_algo, row.payload_hash);
}
