//! # shiftgate-store
//!
//! Datastore layer for the readiness engine.
//!
//! This crate provides:
//! - domain row types the kernel does not own (`Employee`, `Station`, units,
//!   rosters, induction checkpoints)
//! - `Dataset`, a single JSON document holding all org-scoped rowsets
//! - `MemoryStore`, deterministic org/site-pre-filtered queries over it
//! - `LedgerStore`, the append-only snapshot and governance-event tables
//!   with per-org chain-position allocation and JSONL persistence
//!
//! It intentionally does not evaluate anything. Evaluation lives in
//! `shiftgate-kernel` and orchestration in `shiftgate-engine`.

pub mod dataset;
pub mod ledger;
pub mod memory;
pub mod model;

pub use dataset::Dataset;
pub use ledger::{
    GovernanceEventRow, LedgerError, LedgerStore, SnapshotRow, read_ledger_jsonl,
    write_ledger_jsonl,
};
pub use memory::{MemoryStore, StoreError};
pub use model::{
    CheckpointCompletion, Employee, InductionCheckpoint, RosterAssignment, Station, Unit,
    UnitPolicy,
};
