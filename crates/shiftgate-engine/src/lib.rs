//! # shiftgate-engine
//!
//! Orchestration over the pure kernel evaluators:
//!
//! - `cockpit`: the Cockpit Readiness Aggregator, one complete readiness
//!   computation per (org, site, shift) with policy short-circuits
//! - `token`: short-lived HMAC-signed execution tokens binding a computed
//!   readiness state to a later write
//! - `ledger`: immutable hash-chained readiness snapshots with full-chain
//!   verification
//! - `gate`: the governance wrapper that re-evaluates, blocks, and audits
//!   every mutating action
//!
//! Everything here is invoked per request. No readiness result is cached in
//! process; the datastore is the only shared mutable state.

pub mod canonical;
pub mod cockpit;
pub mod config;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod policy;
pub mod token;

pub use canonical::{canonical_bytes, sha256_hex};
pub use cockpit::{
    CockpitAggregator, LegalStatus, ReadinessContext, ReadinessResult, ReadinessStatus,
};
pub use config::EngineConfig;
pub use error::EngineError;
pub use gate::{GateAction, GateDecision, GateOutcome, GovernanceGate};
pub use ledger::{
    ChainFault, ChainVerification, DUPLICATE_FREEZE_WINDOW_SECS, HASH_ALGO_V1, HASH_ALGO_V2,
    freeze_snapshot, verify_chain,
};
pub use policy::{PolicyEnvelope, policy_fingerprint};
pub use token::{ExecutionToken, TokenError, TokenService};
