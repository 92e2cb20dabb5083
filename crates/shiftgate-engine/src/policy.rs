//! The policy envelope: which unit policies were in force at evaluation time.
//!
//! Token issuance and snapshot rows bind to the envelope's fingerprint so a
//! later write can be checked against the exact policy version the decision
//! was computed under.

use serde::{Deserialize, Serialize};

use crate::canonical::hash_value;
use crate::error::EngineError;

/// One resolved unit-to-policy association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPolicyRef {
    pub unit_id: String,
    pub policy_id: String,
    pub version: u32,
}

/// Snapshot of the compliance configuration in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompliancePolicyRef {
    pub requirement_count: usize,
    pub binding_count: usize,
}

/// Canonical policy snapshot returned with every readiness result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEnvelope {
    /// Sorted by unit id for determinism.
    pub units: Vec<UnitPolicyRef>,
    pub compliance: CompliancePolicyRef,
}

impl PolicyEnvelope {
    pub fn new(mut units: Vec<UnitPolicyRef>, compliance: CompliancePolicyRef) -> Self {
        units.sort_by(|a, b| a.unit_id.cmp(&b.unit_id));
        Self { units, compliance }
    }
}

/// Fingerprint of an envelope plus the reason codes in force.
///
/// SHA-256 over the canonical serialization of `{envelope, reason_codes}`
/// with the reason codes sorted.
pub fn policy_fingerprint(
    envelope: &PolicyEnvelope,
    reason_codes: &[String],
) -> Result<String, EngineError> {
    let mut codes: Vec<&str> = reason_codes.iter().map(String::as_str).collect();
    codes.sort_unstable();
    codes.dedup();

    let value = serde_json::json!({
        "envelope": serde_json::to_value(envelope)
            .map_err(|e| EngineError::Serialize(e.to_string()))?,
        "reason_codes": codes,
    });
    Ok(hash_value(&value))
}
