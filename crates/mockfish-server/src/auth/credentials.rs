//! Pluggable credential storage.

use std::collections::HashMap;

use subtle::ConstantTimeEq;

/// A user known to the credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub role: String,
    pub enabled: bool,
}

/// Maps credentials to identities.
pub trait CredentialStore: Send + Sync {
    /// Whether `secret` is the current secret of an enabled user.
    fn verify(&self, username: &str, secret: &str) -> bool;

    /// Every known identity, in no particular order.
    fn identities(&self) -> Vec<Identity>;
}

struct Entry {
    identity: Identity,
    secret: String,
}

/// Fixed, in-memory credential table.
#[derive(Default)]
pub struct StaticCredentials {
    users: HashMap<String, Entry>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two built-in accounts: `admin` (Administrator) and `operator` (Operator).
    pub fn seeded() -> Self {
        Self::new()
            .with_user("admin", "password", "Administrator")
            .with_user("operator", "password", "Operator")
    }

    #[must_use]
    pub fn with_user(mut self, username: &str, secret: &str, role: &str) -> Self {
        self.users.insert(
            username.to_string(),
            Entry {
                identity: Identity {
                    username: username.to_string(),
                    role: role.to_string(),
                    enabled: true,
                },
                secret: secret.to_string(),
            },
        );
        self
    }

    #[must_use]
    pub fn with_disabled_user(mut self, username: &str, secret: &str, role: &str) -> Self {
        self = self.with_user(username, secret, role);
        if let Some(entry) = self.users.get_mut(username) {
            entry.identity.enabled = false;
        }
        self
    }
}

impl CredentialStore for StaticCredentials {
    fn verify(&self, username: &str, secret: &str) -> bool {
        self.users.get(username).is_some_and(|entry| {
            entry.identity.enabled && bool::from(entry.secret.as_bytes().ct_eq(secret.as_bytes()))
        })
    }

    fn identities(&self) -> Vec<Identity> {
        self.users.values().map(|e| e.identity.clone()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn seeded_users_verify() {
        let creds = StaticCredentials::seeded();
        assert!(creds.verify("admin", "password"));
        assert!(creds.verify("operator", "password"));
    }

    #[test]
    fn wrong_secret_or_user_fails() {
        let creds = StaticCredentials::seeded();
        assert!(!creds.verify("admin", "wrong"));
        assert!(!creds.verify("admin", "password "));
        assert!(!creds.verify("admin", ""));
        assert!(!creds.verify("nobody", "password"));
        assert!(!creds.verify("Admin", "password"));
    }

    #[test]
    fn disabled_user_fails() {
        let creds = StaticCredentials::new().with_disabled_user("guest", "pw", "ReadOnly");
        assert!(!creds.verify("guest", "pw"));
        assert_eq!(creds.identities().len(), 1);
        assert!(!creds.identities()[0].enabled);
    }
}
