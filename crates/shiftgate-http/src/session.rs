//! Server-side session context.
//!
//! Org and site always come from here. A query parameter naming an org or
//! site is ignored by construction: routes simply have no way to express
//! one.

/// The caller's resolved operating context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub org_id: String,
    pub site_id: String,
    pub actor: String,
}

/// Resolves the session for an incoming request.
///
/// `None` means unauthenticated; the server answers 401 without touching
/// any data.
pub trait SessionResolver: Send + Sync {
    fn resolve(&self) -> Option<Session>;
}

/// Fixed session from server configuration. Suits single-tenant
/// deployments and the CLI `serve` command, where the operating context is
/// chosen at startup.
#[derive(Debug, Clone)]
pub struct StaticSessionResolver {
    session: Session,
}

impl StaticSessionResolver {
    pub fn new(org_id: impl Into<String>, site_id: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            session: Session {
                org_id: org_id.into(),
                site_id: site_id.into(),
                actor: actor.into(),
            },
        }
    }
}

impl SessionResolver for StaticSessionResolver {
    fn resolve(&self) -> Option<Session> {
        Some(self.session.clone())
    }
}
