//! Shared helpers for command implementations: loading inputs, parsing
//! dates, and the exit-on-error policy every subcommand follows.

use chrono::NaiveDate;
use std::path::Path;
use std::process;

use shiftgate_engine::ReadinessContext;
use shiftgate_store::{LedgerStore, MemoryStore};

pub fn load_store(data: &str) -> MemoryStore {
    MemoryStore::load_json(data).unwrap_or_else(|e| {
        eprintln!("error: failed to load dataset `{data}`: {e}");
        process::exit(1);
    })
}

/// A missing ledger file is an empty ledger; a malformed one is fatal.
pub fn load_ledger(path: &str) -> LedgerStore {
    if !Path::new(path).exists() {
        return LedgerStore::default();
    }
    LedgerStore::load_jsonl(path).unwrap_or_else(|e| {
        eprintln!("error: failed to load ledger `{path}`: {e}");
        process::exit(1);
    })
}

pub fn save_ledger(ledger: &LedgerStore, path: &str) {
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        eprintln!("error: failed to create `{}`: {e}", parent.display());
        process::exit(1);
    }
    if let Err(e) = ledger.save_jsonl(path) {
        eprintln!("error: failed to write ledger `{path}`: {e}");
        process::exit(1);
    }
}

pub fn parse_date(raw: &str) -> NaiveDate {
    raw.parse::<NaiveDate>().unwrap_or_else(|_| {
        eprintln!("error: invalid --date `{raw}` (expected ISO format, e.g. 2026-08-25)");
        process::exit(1);
    })
}

pub fn context(org: String, site: String, shift: String, date: &str) -> ReadinessContext {
    ReadinessContext {
        org_id: org,
        site_id: site,
        shift_code: shift,
        shift_date: parse_date(date),
    }
}

pub fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("error: failed to serialize output: {e}");
            process::exit(1);
        }
    }
}
