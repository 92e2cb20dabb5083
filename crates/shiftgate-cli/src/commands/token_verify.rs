use chrono::Utc;
use std::process;

use shiftgate_engine::{EngineConfig, TokenService};

use crate::support::print_json;

pub fn run(token: String, json: bool) {
    let service = TokenService::from_config(&EngineConfig::from_env());

    match service.verify(&token, Utc::now()) {
        Ok(claims) => {
            if json {
                print_json(&claims);
            } else {
                println!("token valid");
                println!(
                    "  scope: {}/{} {} {}",
                    claims.org_id, claims.site_id, claims.shift_code, claims.shift_date
                );
                println!("  readiness: {:?}", claims.readiness_status);
                println!("  actions: {}", claims.allowed_actions.join(", "));
                println!("  policy fingerprint: {}", claims.policy_fingerprint);
            }
        }
        Err(e) => {
            eprintln!("error: {}: {e}", e.code());
            process::exit(1);
        }
    }
}
