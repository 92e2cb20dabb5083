//! The governance gate: the one seam mutating actions pass through.
//!
//! `guard` recomputes readiness for the action's context at call time, so a
//! stale result in a caller's hand can never authorize a write. Every guard
//! call leaves exactly one governance event in the ledger, allowed or
//! blocked. Audit persistence is fire-and-log: a failed flush is reported
//! but never flips the decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use shiftgate_store::{GovernanceEventRow, LedgerStore, MemoryStore};

use crate::cockpit::{CockpitAggregator, LegalStatus, ReadinessContext, ReadinessResult};
use crate::error::EngineError;

/// A mutating action presented to the gate.
///
/// `shift_scoped` actions are judged against the full shift readiness
/// picture; org-scoped ones only against site and policy validity, so a
/// roster problem on some shift never blocks org-level administration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateAction {
    pub name: String,
    pub target: String,
    pub shift_scoped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateOutcome {
    #[serde(rename = "ALLOWED")]
    Allowed,
    #[serde(rename = "BLOCKED")]
    Blocked,
}

/// What the gate decided, with the readiness evidence it decided on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDecision {
    pub outcome: GateOutcome,
    pub reason_codes: Vec<String>,
    pub readiness: ReadinessResult,
    pub event_id: String,
}

impl GateDecision {
    pub fn allowed(&self) -> bool {
        self.outcome == GateOutcome::Allowed
    }
}

/// Evaluates actions against live readiness and records every decision.
pub struct GovernanceGate<'a> {
    store: &'a MemoryStore,
    /// When set, the ledger is flushed here after each decision.
    audit_path: Option<PathBuf>,
}

impl<'a> GovernanceGate<'a> {
    pub fn new(store: &'a MemoryStore) -> Self {
        Self {
            store,
            audit_path: None,
        }
    }

    pub fn with_audit_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.audit_path = Some(path.into());
        self
    }

    /// Decide one action and append its governance event.
    pub fn guard(
        &self,
        ledger: &mut LedgerStore,
        actor: &str,
        action: &GateAction,
        ctx: &ReadinessContext,
        idempotency_key: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<GateDecision, EngineError> {
        let aggregator = CockpitAggregator::new(self.store);
        let readiness = if action.shift_scoped {
            aggregator.evaluate(ctx, now)?
        } else {
            aggregator.evaluate_org(ctx, now)?
        };

        let outcome = if readiness.is_actionable() {
            GateOutcome::Allowed
        } else {
            GateOutcome::Blocked
        };
        let reason_codes = match outcome {
            GateOutcome::Allowed => vec![],
            GateOutcome::Blocked => readiness.reason_codes.clone(),
        };

        match outcome {
            GateOutcome::Allowed => tracing::info!(
                actor,
                action = %action.name,
                target = %action.target,
                "gate allowed"
            ),
            GateOutcome::Blocked => tracing::warn!(
                actor,
                action = %action.name,
                target = %action.target,
                reasons = ?reason_codes,
                "gate blocked"
            ),
        }

        let event_id = Uuid::new_v4().to_string();
        ledger.append_event(GovernanceEventRow {
            id: event_id.clone(),
            org_id: ctx.org_id.clone(),
            actor: actor.to_string(),
            action: action.name.clone(),
            target: action.target.clone(),
            outcome: wire_outcome(outcome).to_string(),
            legitimacy_status: wire_legal(readiness.legitimacy_status).to_string(),
            readiness_status: wire_status(&readiness),
            reason_codes: reason_codes.clone(),
            idempotency_key,
            occurred_at: now,
        });

        if let Some(path) = &self.audit_path {
            if let Err(error) = ledger.save_jsonl(path) {
                tracing::error!(path = %path.display(), %error, "audit flush failed");
            }
        }

        Ok(GateDecision {
            outcome,
            reason_codes,
            readiness,
            event_id,
        })
    }
}

fn wire_outcome(outcome: GateOutcome) -> &'static str {
    match outcome {
        GateOutcome::Allowed => "ALLOWED",
        GateOutcome::Blocked => "BLOCKED",
    }
}

fn wire_legal(status: LegalStatus) -> &'static str {
    match status {
        LegalStatus::Ok => "OK",
        LegalStatus::LegalStop => "LEGAL_STOP",
    }
}

fn wire_status(readiness: &ReadinessResult) -> String {
    serde_json::to_value(readiness.status)
        .ok()
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_default()
}
