//! Token issuing and resolution.
//!
//! The order workflows only ask whether a token is currently valid and whose it is
//! ([`TokenVerifier`]). Login hands out tokens through [`TokenIssuer`].

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

pub trait TokenVerifier: Send + Sync {
    /// Whether the token is known and unexpired.
    fn validate(&self, token: &str) -> bool;

    /// The login id the token was issued to, if the token is valid.
    fn login_id(&self, token: &str) -> Option<String>;
}

pub trait TokenIssuer: Send + Sync {
    /// A fresh token bound to `login_id` for `ttl`.
    fn issue(&self, login_id: &str, ttl: Duration) -> String;

    /// Invalidates a token. Returns `false` if it was not known.
    fn revoke(&self, token: &str) -> bool;
}

#[derive(Debug, Clone)]
struct Grant {
    login_id: String,
    expires_at: DateTime<Utc>,
}

/// In-memory verifier: a table of opaque tokens, each bound to a login id until it expires.
#[derive(Clone, Default)]
pub struct StaticTokenVerifier {
    grants: Arc<DashMap<String, Grant>>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `token` to `login_id` for `ttl`, replacing any earlier grant for the token.
    pub fn grant(&self, token: impl Into<String>, login_id: impl Into<String>, ttl: Duration) {
        let grant = Grant {
            login_id: login_id.into(),
            expires_at: Utc::now() + ttl,
        };
        self.grants.insert(token.into(), grant);
    }

    fn live(&self, token: &str) -> Option<Grant> {
        let grant = self.grants.get(token)?.clone();
        if grant.expires_at <= Utc::now() {
            debug!("Token expired");
            return None;
        }
        Some(grant)
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn validate(&self, token: &str) -> bool {
        self.live(token).is_some()
    }

    fn login_id(&self, token: &str) -> Option<String> {
        self.live(token).map(|g| g.login_id)
    }
}

impl TokenIssuer for StaticTokenVerifier {
    fn issue(&self, login_id: &str, ttl: Duration) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.grant(token.clone(), login_id, ttl);
        debug!(login_id, "Token issued");
        token
    }

    fn revoke(&self, token: &str) -> bool {
        self.grants.remove(token).is_some()
    }
}
