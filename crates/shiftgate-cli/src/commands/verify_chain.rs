use std::process;

use shiftgate_engine::verify_chain;

use crate::support::{load_ledger, print_json};

pub fn run(org: String, ledger_path: String, json: bool) {
    let ledger = load_ledger(&ledger_path);
    let report = verify_chain(&ledger, &org);

    if json {
        print_json(&report);
    } else {
        println!("chain for {org}: {}", if report.chain_valid { "valid" } else { "INVALID" });
        println!(
            "  verified {} of {} snapshots",
            report.verified_snapshots, report.total_snapshots
        );
        if let (Some(reason), Some(position)) = (report.reason, report.first_invalid_position) {
            println!("  first fault: {reason:?} at position {position}");
        }
    }

    if !report.chain_valid {
        process::exit(1);
    }
}
