//! Authentication gate.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use super::AppState;
use super::error::ApiError;
use crate::auth::header::authenticate;

/// Paths served without credentials.
const PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/redfish",
    "/redfish/v1",
    "/redfish/v1/",
    "/redfish/v1/$metadata",
    "/redfish/v1/odata",
    "/redfish/v1/SessionService",
    "/redfish/v1/SessionService/Sessions",
];

pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Attach the caller's [`Principal`](crate::auth::Principal) to the request,
/// rejecting unauthenticated requests outside [`PUBLIC_PATHS`].
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let principal = authenticate(req.headers(), &state.identity).await;

    match principal {
        Some(principal) => {
            req.extensions_mut().insert(principal);
        }
        None if is_public(req.uri().path()) => {}
        None => {
            debug!(path = %req.uri().path(), method = %req.method(), "Rejected unauthenticated request");
            return ApiError::AuthenticationRequired.into_response();
        }
    }
    next.run(req).await
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn public_paths_are_exact() {
        assert!(is_public("/redfish/v1/"));
        assert!(is_public("/redfish/v1/SessionService/Sessions"));
        assert!(!is_public("/redfish/v1/SessionService/Sessions/abc"));
        assert!(!is_public("/redfish/v1/Systems"));
    }
}
