//! Engine error taxonomy.

use shiftgate_store::{LedgerError, StoreError};

use crate::token::TokenError;

/// Errors from orchestration: datastore failures, ledger append faults, and
/// token faults. Policy-state problems (`POLICY_MISSING`, `UNIT_MISSING`,
/// `NO_SITE`) are not errors; they are blocking readiness results.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("query failed: {0}")]
    Store(#[from] StoreError),

    #[error("ledger append failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("serialization failed: {0}")]
    Serialize(String),
}
