//! Execution tokens: short-lived signed capabilities.
//!
//! A token proves that at `issued_at` readiness for a shift context was
//! computed as `GO` or `WARNING` against a specific policy fingerprint.
//! Wire format: `base64url(JSON envelope)` where the envelope carries every
//! signed field plus `sig`, the base64url HMAC-SHA256 digest over the
//! canonical serialization of the other fields.
//!
//! Tokens are never persisted. Replay protection via `jti` belongs to the
//! caller, not this service.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, NaiveDate, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use uuid::Uuid;

use crate::canonical::canonical_bytes;
use crate::cockpit::{ReadinessContext, ReadinessResult, ReadinessStatus};
use crate::config::{EngineConfig, MIN_SECRET_LEN};
use crate::error::EngineError;
use crate::policy::policy_fingerprint;

type HmacSha256 = Hmac<Sha256>;

/// Token faults, split so callers can distinguish "retry with a fresh
/// token" (`Expired`) from "reject outright" (`Invalid`).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("TOKEN_EXPIRED: token issued too long ago")]
    Expired,

    #[error("TOKEN_INVALID: {0}")]
    Invalid(String),
}

impl TokenError {
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::Expired => "TOKEN_EXPIRED",
            TokenError::Invalid(_) => "TOKEN_INVALID",
        }
    }
}

/// The signed envelope, without its signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionToken {
    pub org_id: String,
    pub site_id: String,
    pub shift_code: String,
    pub shift_date: NaiveDate,
    pub readiness_status: ReadinessStatus,
    pub policy_fingerprint: String,
    /// Milliseconds since the Unix epoch.
    pub issued_at: i64,
    pub allowed_actions: Vec<String>,
    pub jti: String,
}

/// Issues and verifies execution tokens against the server-held secret.
pub struct TokenService {
    secret: Option<String>,
    ttl_ms: i64,
}

impl TokenService {
    pub fn new(secret: Option<String>, ttl_ms: i64) -> Self {
        Self { secret, ttl_ms }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.signing_secret.clone(), config.token_ttl_ms)
    }

    fn usable_secret(&self) -> Option<&str> {
        self.secret.as_deref().filter(|s| s.len() >= MIN_SECRET_LEN)
    }

    /// Issue a token for an actionable readiness result.
    ///
    /// Returns `Ok(None)` when issuance is disabled (no usable secret) or
    /// the result is not actionable; readiness itself never fails over a
    /// missing secret.
    pub fn issue(
        &self,
        ctx: &ReadinessContext,
        result: &ReadinessResult,
        allowed_actions: &[String],
        now: DateTime<Utc>,
    ) -> Result<Option<String>, EngineError> {
        let Some(secret) = self.usable_secret() else {
            return Ok(None);
        };
        if !matches!(
            result.status,
            ReadinessStatus::Go | ReadinessStatus::Warning
        ) {
            return Ok(None);
        }

        let token = ExecutionToken {
            org_id: ctx.org_id.clone(),
            site_id: ctx.site_id.clone(),
            shift_code: ctx.shift_code.clone(),
            shift_date: ctx.shift_date,
            readiness_status: result.status,
            policy_fingerprint: policy_fingerprint(&result.policy, &result.reason_codes)?,
            issued_at: now.timestamp_millis(),
            allowed_actions: allowed_actions.to_vec(),
            jti: Uuid::new_v4().to_string(),
        };

        Ok(Some(encode(&token, secret)?))
    }

    /// Verify a wire blob and return the embedded token.
    pub fn verify(&self, blob: &str, now: DateTime<Utc>) -> Result<ExecutionToken, TokenError> {
        let Some(secret) = self.usable_secret() else {
            return Err(TokenError::Invalid(
                "signing secret missing or too short".to_string(),
            ));
        };

        let raw = URL_SAFE_NO_PAD
            .decode(blob.as_bytes())
            .map_err(|e| TokenError::Invalid(format!("bad encoding: {e}")))?;
        let mut envelope: Value = serde_json::from_slice(&raw)
            .map_err(|e| TokenError::Invalid(format!("bad envelope: {e}")))?;

        let Some(object) = envelope.as_object_mut() else {
            return Err(TokenError::Invalid("envelope is not an object".to_string()));
        };
        let sig = object
            .remove("sig")
            .and_then(|v| v.as_str().map(String::from))
            .ok_or_else(|| TokenError::Invalid("missing signature".to_string()))?;
        let sig_bytes = URL_SAFE_NO_PAD
            .decode(sig.as_bytes())
            .map_err(|e| TokenError::Invalid(format!("bad signature encoding: {e}")))?;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| TokenError::Invalid("unusable signing secret".to_string()))?;
        mac.update(&canonical_bytes(&envelope));
        // Constant-time comparison.
        mac.verify_slice(&sig_bytes)
            .map_err(|_| TokenError::Invalid("signature mismatch".to_string()))?;

        let token: ExecutionToken = serde_json::from_value(envelope)
            .map_err(|e| TokenError::Invalid(format!("bad token fields: {e}")))?;

        let age_ms = now.timestamp_millis() - token.issued_at;
        if age_ms > self.ttl_ms {
            return Err(TokenError::Expired);
        }

        Ok(token)
    }
}

fn encode(token: &ExecutionToken, secret: &str) -> Result<String, EngineError> {
    let payload =
        serde_json::to_value(token).map_err(|e| EngineError::Serialize(e.to_string()))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| EngineError::Serialize(format!("unusable signing secret: {e}")))?;
    mac.update(&canonical_bytes(&payload));
    let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    let mut envelope = payload;
    envelope
        .as_object_mut()
        .expect("token serializes to an object")
        .insert("sig".to_string(), Value::String(sig));

    let bytes =
        serde_json::to_vec(&envelope).map_err(|e| EngineError::Serialize(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cockpit::LegalStatus;
    use crate::policy::{CompliancePolicyRef, PolicyEnvelope};
    use chrono::TimeZone;

    const SECRET: &str = "correct-horse-battery-staple";

    fn ctx() -> ReadinessContext {
        ReadinessContext {
            org_id: "org-1".to_string(),
            site_id: "site-1".to_string(),
            shift_code: "EARLY".to_string(),
            shift_date: NaiveDate::from_ymd_opt(2026, 8, 25).expect("valid date"),
        }
    }

    fn result(status: ReadinessStatus) -> ReadinessResult {
        ReadinessResult {
            readiness_score: 100,
            status,
            legitimacy_status: LegalStatus::Ok,
            grade: "A".to_string(),
            blocking_stations: vec![],
            reason_codes: vec![],
            roster_count: 3,
            sampled_blockers: vec![],
            calculated_at: Utc::now(),
            policy: PolicyEnvelope::new(
                vec![],
                CompliancePolicyRef {
                    requirement_count: 0,
                    binding_count: 0,
                },
            ),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 25, 6, 0, 0).single().expect("valid instant")
    }

    fn service() -> TokenService {
        TokenService::new(Some(SECRET.to_string()), 300_000)
    }

    #[test]
    fn roundtrip_verifies() {
        let service = service();
        let blob = service
            .issue(&ctx(), &result(ReadinessStatus::Go), &["roster.publish".to_string()], now())
            .expect("issue")
            .expect("token present");

        let token = service.verify(&blob, now()).expect("verify");
        assert_eq!(token.org_id, "org-1");
        assert_eq!(token.readiness_status, ReadinessStatus::Go);
        assert_eq!(token.allowed_actions, vec!["roster.publish".to_string()]);
        assert!(!token.jti.is_empty());
    }

    #[test]
    fn no_secret_disables_issuance() {
        let service = TokenService::new(None, 300_000);
        let got = service
            .issue(&ctx(), &result(ReadinessStatus::Go), &[], now())
            .expect("issue");
        assert!(got.is_none());
    }

    #[test]
    fn short_secret_disables_issuance() {
        let service = TokenService::new(Some("tiny".to_string()), 300_000);
        let got = service
            .issue(&ctx(), &result(ReadinessStatus::Go), &[], now())
            .expect("issue");
        assert!(got.is_none());
    }

    #[test]
    fn no_go_result_gets_no_token() {
        let got = service()
            .issue(&ctx(), &result(ReadinessStatus::NoGo), &[], now())
            .expect("issue");
        assert!(got.is_none());
    }

    #[test]
    fn tampered_field_fails_as_invalid() {
        let service = service();
        let blob = service
            .issue(&ctx(), &result(ReadinessStatus::Warning), &[], now())
            .expect("issue")
            .expect("token present");

        // Decode, upgrade WARNING to GO, re-encode without re-signing.
        let raw = URL_SAFE_NO_PAD.decode(blob.as_bytes()).expect("decode");
        let mut envelope: Value = serde_json::from_slice(&raw).expect("parse");
        envelope["readiness_status"] = Value::String("GO".to_string());
        let forged =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&envelope).expect("serialize"));

        let err = service.verify(&forged, now()).expect_err("must fail");
        assert_eq!(err.code(), "TOKEN_INVALID");
    }

    #[test]
    fn expired_token_is_distinct_from_invalid() {
        let service = service();
        let blob = service
            .issue(&ctx(), &result(ReadinessStatus::Go), &[], now())
            .expect("issue")
            .expect("token present");

        let later = now() + chrono::Duration::milliseconds(300_001);
        let err = service.verify(&blob, later).expect_err("must expire");
        assert_eq!(err, TokenError::Expired);
        assert_eq!(err.code(), "TOKEN_EXPIRED");
    }

    #[test]
    fn garbage_blob_is_invalid() {
        let err = service()
            .verify("not-base64url-json!!!", now())
            .expect_err("must fail");
        assert_eq!(err.code(), "TOKEN_INVALID");
    }

    #[test]
    fn verify_without_secret_is_invalid() {
        let issuing = service();
        let blob = issuing
            .issue(&ctx(), &result(ReadinessStatus::Go), &[], now())
            .expect("issue")
            .expect("token present");

        let bare = TokenService::new(None, 300_000);
        let err = bare.verify(&blob, now()).expect_err("must fail");
        assert_eq!(err.code(), "TOKEN_INVALID");
    }

    #[test]
    fn fingerprint_binds_policy_to_token() {
        let service = service();
        let mut warned = result(ReadinessStatus::Warning);
        warned.reason_codes = vec!["COMPLIANCE_EXPIRING".to_string()];

        let plain = service
            .issue(&ctx(), &result(ReadinessStatus::Go), &[], now())
            .expect("issue")
            .expect("token");
        let flagged = service
            .issue(&ctx(), &warned, &[], now())
            .expect("issue")
            .expect("token");

        let plain = service.verify(&plain, now()).expect("verify");
        let flagged = service.verify(&flagged, now()).expect("verify");
        assert_ne!(plain.policy_fingerprint, flagged.policy_fingerprint);
    }
}
