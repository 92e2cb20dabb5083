//! Append-only snapshot and governance-event tables.
//!
//! `ledger.record.v1` is the JSONL surface: one line per record, snapshots
//! and governance events interleaved in append order. Rows are never mutated
//! or deleted; chain positions are allocated sequentially per organization
//! and never reused.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, Write};
use std::path::Path;

pub const LEDGER_RECORD_SCHEMA: &str = "ledger.record.v1";

fn default_ledger_schema() -> String {
    LEDGER_RECORD_SCHEMA.to_string()
}

/// One immutable readiness freeze.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub id: String,
    pub org_id: String,
    pub site_id: String,
    pub shift_date: NaiveDate,
    pub shift_code: String,
    pub legitimacy_status: String,
    pub readiness_status: String,
    pub readiness_score: u32,
    pub grade: String,
    pub roster_count: usize,
    pub reason_codes: Vec<String>,
    pub sampled_blockers: Vec<String>,
    pub engine_version: String,
    pub payload_hash: String,
    pub payload_hash_algo: String,
    /// Prior chain member's `payload_hash`; empty at position 1.
    pub previous_hash: String,
    /// Sequential index within the organization's ledger, starting at 1.
    pub chain_position: u64,
    pub created_at: DateTime<Utc>,
}

/// One gate evaluation outcome. Written on every guard call, allowed or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceEventRow {
    pub id: String,
    pub org_id: String,
    pub actor: String,
    pub action: String,
    pub target: String,
    /// `ALLOWED` or `BLOCKED`.
    pub outcome: String,
    pub legitimacy_status: String,
    pub readiness_status: String,
    pub reason_codes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerRecordBody {
    Snapshot { snapshot: SnapshotRow },
    GovernanceEvent { event: GovernanceEventRow },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    #[serde(default = "default_ledger_schema")]
    pub schema: String,
    #[serde(flatten)]
    pub body: LedgerRecordBody,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("line {0}: I/O error: {1}")]
    Io(usize, String),

    #[error("line {0}: parse error: {1}")]
    Parse(usize, String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("unsupported ledger schema: {0}")]
    UnsupportedSchema(String),

    #[error(
        "chain position conflict for org {org_id}: expected {expected}, got {got}"
    )]
    ChainPositionConflict {
        org_id: String,
        expected: u64,
        got: u64,
    },
}

/// In-memory append-only state for snapshots and governance events.
#[derive(Debug, Clone, Default)]
pub struct LedgerStore {
    snapshots: Vec<SnapshotRow>,
    events: Vec<GovernanceEventRow>,
}

impl LedgerStore {
    /// Next chain position for an organization: max + 1, starting at 1.
    pub fn next_chain_position(&self, org_id: &str) -> u64 {
        self.snapshots
            .iter()
            .filter(|s| s.org_id == org_id)
            .map(|s| s.chain_position)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Tail of the organization's chain, when any.
    pub fn last_snapshot(&self, org_id: &str) -> Option<&SnapshotRow> {
        self.snapshots
            .iter()
            .filter(|s| s.org_id == org_id)
            .max_by_key(|s| s.chain_position)
    }

    /// Existing snapshot for the same freeze key created within the
    /// duplicate window ending at `now`.
    pub fn recent_snapshot(
        &self,
        org_id: &str,
        site_id: &str,
        shift_date: NaiveDate,
        shift_code: &str,
        now: DateTime<Utc>,
        window_secs: i64,
    ) -> Option<&SnapshotRow> {
        self.snapshots
            .iter()
            .filter(|s| {
                s.org_id == org_id
                    && s.site_id == site_id
                    && s.shift_date == shift_date
                    && s.shift_code == shift_code
                    && (now - s.created_at).num_seconds() <= window_secs
                    && s.created_at <= now
            })
            .max_by_key(|s| s.chain_position)
    }

    /// Append a snapshot, enforcing the per-org sequential constraint the
    /// datastore is responsible for. This is the uniqueness seam, not a
    /// client-side lock.
    pub fn append_snapshot(&mut self, row: SnapshotRow) -> Result<&SnapshotRow, LedgerError> {
        let expected = self.next_chain_position(&row.org_id);
        if row.chain_position != expected {
            return Err(LedgerError::ChainPositionConflict {
                org_id: row.org_id.clone(),
                expected,
                got: row.chain_position,
            });
        }
        self.snapshots.push(row);
        Ok(self.snapshots.last().expect("just pushed"))
    }

    pub fn append_event(&mut self, row: GovernanceEventRow) {
        self.events.push(row);
    }

    /// All snapshots for an org in chain order.
    pub fn snapshots_for_org(&self, org_id: &str) -> Vec<&SnapshotRow> {
        let mut rows: Vec<&SnapshotRow> = self
            .snapshots
            .iter()
            .filter(|s| s.org_id == org_id)
            .collect();
        rows.sort_by_key(|s| s.chain_position);
        rows
    }

    pub fn events_for_org(&self, org_id: &str) -> Vec<&GovernanceEventRow> {
        self.events.iter().filter(|e| e.org_id == org_id).collect()
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Flatten to JSONL records in append order, snapshots before events.
    pub fn to_records(&self) -> Vec<LedgerRecord> {
        let mut records: Vec<LedgerRecord> = self
            .snapshots
            .iter()
            .cloned()
            .map(|snapshot| LedgerRecord {
                schema: LEDGER_RECORD_SCHEMA.to_string(),
                body: LedgerRecordBody::Snapshot { snapshot },
            })
            .collect();
        records.extend(self.events.iter().cloned().map(|event| LedgerRecord {
            schema: LEDGER_RECORD_SCHEMA.to_string(),
            body: LedgerRecordBody::GovernanceEvent { event },
        }));
        records
    }

    /// Rebuild a store from parsed records.
    pub fn from_records(records: Vec<LedgerRecord>) -> Result<Self, LedgerError> {
        let mut store = Self::default();
        for record in records {
            if record.schema != LEDGER_RECORD_SCHEMA {
                return Err(LedgerError::UnsupportedSchema(record.schema));
            }
            match record.body {
                LedgerRecordBody::Snapshot { snapshot } => store.snapshots.push(snapshot),
                LedgerRecordBody::GovernanceEvent { event } => store.events.push(event),
            }
        }
        Ok(store)
    }

    pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let file = File::open(path.as_ref())
            .map_err(|e| LedgerError::Io(0, format!("{}: {e}", path.as_ref().display())))?;
        let records = read_ledger_jsonl(std::io::BufReader::new(file))?;
        Self::from_records(records)
    }

    pub fn save_jsonl(&self, path: impl AsRef<Path>) -> Result<(), LedgerError> {
        let mut file = File::create(path.as_ref())
            .map_err(|e| LedgerError::Io(0, format!("{}: {e}", path.as_ref().display())))?;
        write_ledger_jsonl(&mut file, &self.to_records())
    }
}

pub fn read_ledger_jsonl(reader: impl BufRead) -> Result<Vec<LedgerRecord>, LedgerError> {
    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| LedgerError::Io(line_no + 1, e.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record: LedgerRecord = serde_json::from_str(trimmed)
            .map_err(|e| LedgerError::Parse(line_no + 1, e.to_string()))?;
        records.push(record);
    }
    Ok(records)
}

pub fn write_ledger_jsonl(
    writer: &mut impl Write,
    records: &[LedgerRecord],
) -> Result<(), LedgerError> {
    for record in records {
        let line =
            serde_json::to_string(record).map_err(|e| LedgerError::Serialize(e.to_string()))?;
        writeln!(writer, "{line}").map_err(|e| LedgerError::Io(0, e.to_string()))?;
    }
    Ok(())
}
