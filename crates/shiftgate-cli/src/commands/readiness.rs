use chrono::Utc;
use serde_json::Value;
use std::process;

use shiftgate_engine::{CockpitAggregator, EngineConfig, TokenService};

use crate::support::{context, load_store, print_json};

pub fn run(org: String, site: String, shift: String, date: String, data: String, json: bool) {
    let store = load_store(&data);
    let ctx = context(org, site, shift, &date);
    let now = Utc::now();

    let result = CockpitAggregator::new(&store)
        .evaluate(&ctx, now)
        .unwrap_or_else(|e| {
            eprintln!("error: readiness evaluation failed: {e}");
            process::exit(1);
        });

    let token = TokenService::from_config(&EngineConfig::from_env())
        .issue(&ctx, &result, &["roster.publish".to_string()], now)
        .unwrap_or_else(|e| {
            eprintln!("error: token issuance failed: {e}");
            process::exit(1);
        });

    if json {
        let mut body = serde_json::to_value(&result).unwrap_or_else(|e| {
            eprintln!("error: failed to serialize result: {e}");
            process::exit(1);
        });
        if let (Some(object), Some(token)) = (body.as_object_mut(), token) {
            object.insert("execution_token".to_string(), Value::String(token));
        }
        print_json(&body);
        return;
    }

    println!("readiness {}/{} {} {}", ctx.org_id, ctx.site_id, ctx.shift_code, ctx.shift_date);
    println!("  status: {:?}", result.status);
    println!("  legitimacy: {:?}", result.legitimacy_status);
    println!("  score: {} (grade {})", result.readiness_score, result.grade);
    println!("  roster: {}", result.roster_count);
    if !result.blocking_stations.is_empty() {
        println!("  blocking stations: {}", result.blocking_stations.join(", "));
    }
    if !result.reason_codes.is_empty() {
        println!("  reasons: {}", result.reason_codes.join(", "));
    }
    match token {
        Some(_) => println!("  execution token: issued"),
        None => println!("  execution token: not issued"),
    }
}
