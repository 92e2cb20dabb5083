//! Environment-sourced engine configuration.

use std::env;

/// Minimum accepted signing-secret length.
pub const MIN_SECRET_LEN: usize = 16;

/// Default execution-token lifetime in milliseconds.
pub const DEFAULT_TOKEN_TTL_MS: i64 = 300_000;

pub const SIGNING_SECRET_VAR: &str = "SHIFTGATE_SIGNING_SECRET";
pub const TOKEN_TTL_VAR: &str = "SHIFTGATE_TOKEN_TTL_MS";

/// Server-held configuration for token issuance and verification.
///
/// An absent or too-short secret disables token issuance; readiness
/// computation itself never depends on it.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub signing_secret: Option<String>,
    pub token_ttl_ms: i64,
}

impl EngineConfig {
    pub fn new(signing_secret: Option<String>, token_ttl_ms: i64) -> Self {
        Self {
            signing_secret,
            token_ttl_ms,
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        let signing_secret = env::var(SIGNING_SECRET_VAR).ok().filter(|s| !s.is_empty());
        let token_ttl_ms = env::var(TOKEN_TTL_VAR)
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|ttl| *ttl > 0)
            .unwrap_or(DEFAULT_TOKEN_TTL_MS);
        Self {
            signing_secret,
            token_ttl_ms,
        }
    }

    /// Secret usable for signing, when present and long enough.
    pub fn usable_secret(&self) -> Option<&str> {
        self.signing_secret
            .as_deref()
            .filter(|s| s.len() >= MIN_SECRET_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secret_is_not_usable() {
        let config = EngineConfig::new(Some("short".to_string()), DEFAULT_TOKEN_TTL_MS);
        assert!(config.usable_secret().is_none());
    }

    #[test]
    fn long_secret_is_usable() {
        let config = EngineConfig::new(
            Some("0123456789abcdef".to_string()),
            DEFAULT_TOKEN_TTL_MS,
        );
        assert_eq!(config.usable_secret(), Some("0123456789abcdef"));
    }
}
