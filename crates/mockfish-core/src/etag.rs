//! Entity validators for conditional GET.
//!
//! A validator is a short hex digest of a document's canonical serialized
//! form. `serde_json::Value` keeps object keys sorted, so equal documents
//! always hash to the same validator.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest.
const VALIDATOR_LEN: usize = 16;

/// A strong entity tag, stored without surrounding quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityTag(String);

impl EntityTag {
    /// Validator for an opaque byte representation (e.g. XML or YAML documents).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut digest = hex::encode(Sha256::digest(bytes));
        digest.truncate(VALIDATOR_LEN);
        Self(digest)
    }

    /// Validator for the canonical JSON form of `value`.
    pub fn from_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Self> {
        serde_json::to_vec(value).map(|bytes| Self::from_bytes(&bytes))
    }

    /// Unquoted digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether an `If-None-Match` header value matches this validator.
    ///
    /// Accepts `*`, a single tag, or a comma-separated list of tags; each tag
    /// may be quoted and may carry a `W/` prefix.
    pub fn matches(&self, if_none_match: &str) -> bool {
        if_none_match
            .split(',')
            .map(str::trim)
            .filter(|candidate| !candidate.is_empty())
            .any(|candidate| candidate == "*" || normalize(candidate) == self.0)
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

fn normalize(tag: &str) -> &str {
    let tag = tag.strip_prefix("W/").unwrap_or(tag);
    tag.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(tag)
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validator_is_short_hex() {
        let tag = EntityTag::from_bytes(b"hello");
        assert_eq!(tag.as_str().len(), VALIDATOR_LEN);
        assert!(tag.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(tag.to_string(), format!("\"{}\"", tag.as_str()));
    }

    #[test]
    fn equal_documents_share_a_validator() {
        let a = json!({"Name": "System", "Id": "1", "PowerState": "On"});
        let b = json!({"PowerState": "On", "Id": "1", "Name": "System"});
        assert_eq!(
            EntityTag::from_json(&a).unwrap(),
            EntityTag::from_json(&b).unwrap()
        );
    }

    #[test]
    fn different_documents_differ() {
        let a = json!({"PowerState": "On"});
        let b = json!({"PowerState": "Off"});
        assert_ne!(
            EntityTag::from_json(&a).unwrap(),
            EntityTag::from_json(&b).unwrap()
        );
    }

    #[test]
    fn matches_quoted_unquoted_and_wildcard() {
        let tag = EntityTag::from_bytes(b"doc");
        assert!(tag.matches(&tag.to_string()));
        assert!(tag.matches(tag.as_str()));
        assert!(tag.matches(&format!("W/{tag}")));
        assert!(tag.matches("*"));
        assert!(!tag.matches("\"0000000000000000\""));
        assert!(!tag.matches(""));
    }

    #[test]
    fn matches_any_entry_of_a_list() {
        let tag = EntityTag::from_bytes(b"doc");
        let header = format!("\"deadbeef\", {tag}");
        assert!(tag.matches(&header));
    }
}
