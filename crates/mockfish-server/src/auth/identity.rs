//! Identity store: credential checks and session tokens.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::credentials::{CredentialStore, Identity};

/// Random bytes per session token (hex-encoded to twice as many characters).
const TOKEN_BYTES: usize = 32;

/// An authenticated session. The token doubles as the session identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Session lifetime rules.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    pub ttl: Duration,
    pub enforce_expiry: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            enforce_expiry: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Random source unavailable: {0}")]
    RandomSource(String),

    #[error("Session lifetime is out of range")]
    InvalidTtl,
}

/// Thread-safe credential and session store.
pub struct IdentityStore {
    credentials: Arc<dyn CredentialStore>,
    sessions: RwLock<HashMap<String, Session>>,
    policy: SessionPolicy,
}

impl IdentityStore {
    pub fn new(credentials: Arc<dyn CredentialStore>, policy: SessionPolicy) -> Self {
        Self {
            credentials,
            sessions: RwLock::new(HashMap::new()),
            policy,
        }
    }

    pub const fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Exact-match check of a username/secret pair against an enabled user.
    pub fn validate_credentials(&self, username: &str, secret: &str) -> bool {
        let ok = self.credentials.verify(username, secret);
        if !ok {
            warn!(username, "Credential check failed");
        }
        ok
    }

    /// Issue a fresh session for `username`.
    pub async fn create_session(&self, username: &str) -> Result<Session, IdentityError> {
        let ttl = TimeDelta::from_std(self.policy.ttl).map_err(|_| IdentityError::InvalidTtl)?;
        let created_at = Utc::now();
        let expires_at = created_at
            .checked_add_signed(ttl)
            .ok_or(IdentityError::InvalidTtl)?;

        let mut sessions = self.sessions.write().await;
        let mut token = generate_token()?;
        while sessions.contains_key(&token) {
            token = generate_token()?;
        }
        let session = Session {
            token: token.clone(),
            username: username.to_string(),
            created_at,
            expires_at,
        };
        sessions.insert(token, session.clone());
        info!(username, "Session created");
        Ok(session)
    }

    /// Resolve a token to its username. Expired tokens are removed.
    pub async fn validate_token(&self, token: &str) -> Option<String> {
        self.session(token).await.map(|s| s.username)
    }

    /// Look up a live session.
    pub async fn session(&self, token: &str) -> Option<Session> {
        let now = Utc::now();
        let session = self.sessions.read().await.get(token).cloned()?;
        if self.policy.enforce_expiry && session.is_expired_at(now) {
            self.sessions.write().await.remove(token);
            debug!(username = %session.username, "Expired session removed on access");
            return None;
        }
        Some(session)
    }

    /// Live sessions owned by `username`, oldest first.
    pub async fn sessions_for(&self, username: &str) -> Vec<Session> {
        let now = Utc::now();
        let mut owned: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.username == username)
            .filter(|s| !(self.policy.enforce_expiry && s.is_expired_at(now)))
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.token.cmp(&b.token)));
        owned
    }

    /// Remove a session. Returns whether one existed.
    pub async fn delete_session(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);
        match &removed {
            Some(session) => info!(username = %session.username, "Session deleted"),
            None => debug!("Delete of unknown session ignored"),
        }
        removed.is_some()
    }

    /// Every identity known to the credential store, sorted by username.
    pub fn list_identities(&self) -> Vec<Identity> {
        let mut identities = self.credentials.identities();
        identities.sort_by(|a, b| a.username.cmp(&b.username));
        identities
    }

    pub fn identity(&self, username: &str) -> Option<Identity> {
        self.credentials
            .identities()
            .into_iter()
            .find(|i| i.username == username)
    }

    /// Drop expired sessions. No-op when expiry is not enforced.
    pub async fn purge_expired(&self) -> usize {
        if !self.policy.enforce_expiry {
            return 0;
        }
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        before - sessions.len()
    }
}

fn generate_token() -> Result<String, IdentityError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| IdentityError::RandomSource(e.to_string()))?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentials;

    fn store(policy: SessionPolicy) -> IdentityStore {
        IdentityStore::new(Arc::new(StaticCredentials::seeded()), policy)
    }

    #[tokio::test]
    async fn token_is_64_hex_chars_and_validates() {
        let store = store(SessionPolicy::default());
        let session = store.create_session("admin").await.unwrap();
        assert_eq!(session.token.len(), 64);
        assert!(session.token.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(
            store.validate_token(&session.token).await.as_deref(),
            Some("admin")
        );
    }

    #[tokio::test]
    async fn tokens_are_unique() {
        let store = store(SessionPolicy::default());
        let a = store.create_session("admin").await.unwrap();
        let b = store.create_session("admin").await.unwrap();
        assert_ne!(a.token, b.token);
        assert_eq!(store.sessions_for("admin").await.len(), 2);
        assert!(store.sessions_for("operator").await.is_empty());
    }

    #[tokio::test]
    async fn deleted_token_stops_validating() {
        let store = store(SessionPolicy::default());
        let session = store.create_session("operator").await.unwrap();
        assert!(store.delete_session(&session.token).await);
        assert!(store.validate_token(&session.token).await.is_none());
        assert!(!store.delete_session(&session.token).await);
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let store = store(SessionPolicy::default());
        assert!(store.validate_token("deadbeef").await.is_none());
        assert!(store.validate_token("").await.is_none());
    }

    #[tokio::test]
    async fn expired_session_is_rejected_and_purged() {
        let store = store(SessionPolicy {
            ttl: Duration::ZERO,
            enforce_expiry: true,
        });
        let a = store.create_session("admin").await.unwrap();
        store.create_session("admin").await.unwrap();
        assert!(store.validate_token(&a.token).await.is_none());
        assert_eq!(store.purge_expired().await, 1);
    }

    #[tokio::test]
    async fn expiry_can_be_disabled() {
        let store = store(SessionPolicy {
            ttl: Duration::ZERO,
            enforce_expiry: false,
        });
        let session = store.create_session("admin").await.unwrap();
        assert!(store.validate_token(&session.token).await.is_some());
        assert_eq!(store.purge_expired().await, 0);
    }

    #[test]
    fn identities_are_sorted() {
        let store = store(SessionPolicy::default());
        let names: Vec<String> = store
            .list_identities()
            .into_iter()
            .map(|i| i.username)
            .collect();
        assert_eq!(names, vec!["admin", "operator"]);
        assert_eq!(store.identity("operator").unwrap().role, "Operator");
        assert!(store.identity("root").is_none());
    }

    #[test]
    fn credentials_delegate_to_store() {
        let store = store(SessionPolicy::default());
        assert!(store.validate_credentials("admin", "password"));
        assert!(!store.validate_credentials("admin", "nope"));
    }
}
