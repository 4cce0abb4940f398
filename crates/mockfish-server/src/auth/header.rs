//! Request credential extraction.
//!
//! Two schemes are recognised: HTTP basic credentials and a session token
//! (`X-Auth-Token`, or `Authorization: Bearer`). Basic is tried first.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::identity::IdentityStore;

pub const X_AUTH_TOKEN: &str = "x-auth-token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Basic,
    Session,
}

/// The authenticated caller, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub scheme: AuthScheme,
}

/// Decode `Authorization: Basic <base64(user:pass)>`.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Session token from `X-Auth-Token` or a bearer authorization header.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = headers.get(X_AUTH_TOKEN).and_then(|v| v.to_str().ok()) {
        return Some(token.trim()).filter(|t| !t.is_empty());
    }
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authenticate a request: basic credentials first, then a session token.
pub async fn authenticate(headers: &HeaderMap, identity: &IdentityStore) -> Option<Principal> {
    if let Some((username, password)) = basic_credentials(headers) {
        if identity.validate_credentials(&username, &password) {
            return Some(Principal {
                username,
                scheme: AuthScheme::Basic,
            });
        }
    }
    let token = session_token(headers)?;
    let username = identity.validate_token(token).await?;
    Some(Principal {
        username,
        scheme: AuthScheme::Session,
    })
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::HeaderValue;

    use super::*;
    use crate::auth::{SessionPolicy, StaticCredentials};

    fn basic(user: &str, pass: &str) -> HeaderValue {
        let encoded = STANDARD.encode(format!("{user}:{pass}"));
        HeaderValue::from_str(&format!("Basic {encoded}")).unwrap()
    }

    fn store() -> IdentityStore {
        IdentityStore::new(
            Arc::new(StaticCredentials::seeded()),
            SessionPolicy::default(),
        )
    }

    #[test]
    fn decodes_basic_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, basic("admin", "pa:ss"));
        assert_eq!(
            basic_credentials(&headers),
            Some(("admin".into(), "pa:ss".into()))
        );
    }

    #[test]
    fn malformed_basic_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic !!!"));
        assert!(basic_credentials(&headers).is_none());
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Digest abc"));
        assert!(basic_credentials(&headers).is_none());
    }

    #[test]
    fn token_from_either_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(session_token(&headers), Some("abc"));
        headers.insert(X_AUTH_TOKEN, HeaderValue::from_static("xyz"));
        assert_eq!(session_token(&headers), Some("xyz"));
    }

    #[tokio::test]
    async fn basic_then_token() {
        let store = store();
        let session = store.create_session("operator").await.unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, basic("admin", "wrong"));
        headers.insert(X_AUTH_TOKEN, HeaderValue::from_str(&session.token).unwrap());
        let principal = authenticate(&headers, &store).await.unwrap();
        assert_eq!(principal.username, "operator");
        assert_eq!(principal.scheme, AuthScheme::Session);

        headers.insert(AUTHORIZATION, basic("admin", "password"));
        let principal = authenticate(&headers, &store).await.unwrap();
        assert_eq!(principal.username, "admin");
        assert_eq!(principal.scheme, AuthScheme::Basic);
    }

    #[tokio::test]
    async fn no_credentials_is_none() {
        assert!(authenticate(&HeaderMap::new(), &store()).await.is_none());
    }
}
