//! SessionService: login, logout, and session lookup.

use axum::Extension;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use mockfish_core::resources::service::session_service as session_service_document;
use mockfish_core::resources::session::{session, sessions_collection};
use serde_json::Value;
use tracing::info;

use crate::auth::Principal;
use crate::auth::header::{X_AUTH_TOKEN, basic_credentials};
use crate::auth::identity::Session;
use crate::server::respond::{conditional_json, created, json_object};
use crate::server::{ApiError, AppState};
use crate::tasks::model::rfc3339;

fn session_document(s: &Session) -> mockfish_core::resources::session::Session {
    session(&s.token, &s.username, rfc3339(s.created_at))
}

/// `GET /redfish/v1/SessionService`
pub async fn session_service(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    conditional_json(
        &headers,
        &session_service_document(state.settings.session_timeout_secs),
    )
}

/// `GET /redfish/v1/SessionService/Sessions`
///
/// Lists the caller's own sessions; anonymous callers see an empty collection.
pub async fn list_sessions(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let sessions = match principal {
        Some(Extension(p)) => state.identity.sessions_for(&p.username).await,
        None => Vec::new(),
    };
    let collection = sessions_collection(sessions.iter().map(|s| s.token.as_str()));
    conditional_json(&headers, &collection)
}

/// `POST /redfish/v1/SessionService/Sessions`
///
/// Credentials come from basic auth, or a `{"UserName", "Password"}` body.
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let (username, password) = match basic_credentials(&headers) {
        Some(credentials) => credentials,
        None => {
            let body = json_object(&body, true)?;
            let field = |name: &str| body.get(name).and_then(Value::as_str).map(str::to_string);
            match (field("UserName"), field("Password")) {
                (Some(user), Some(pass)) => (user, pass),
                _ => return Err(ApiError::AuthenticationRequired),
            }
        }
    };

    if !state.identity.validate_credentials(&username, &password) {
        return Err(ApiError::AuthenticationRequired);
    }
    let session = state.identity.create_session(&username).await?;
    info!(username = %username, "Login succeeded");

    let document = session_document(&session);
    let mut response = created(&document.header.odata_id, &document)?;
    let token = HeaderValue::from_str(&session.token)
        .map_err(|e| ApiError::internal(format!("session token is not a valid header: {e}")))?;
    response.headers_mut().insert(X_AUTH_TOKEN, token);
    Ok(response)
}

/// `GET /redfish/v1/SessionService/Sessions/{token}`
pub async fn get_session(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = state
        .identity
        .session(&token)
        .await
        .ok_or_else(|| ApiError::ResourceNotFound("Session".into()))?;
    conditional_json(&headers, &session_document(&session))
}

/// `DELETE /redfish/v1/SessionService/Sessions/{token}`. Deleting an unknown
/// session still succeeds.
pub async fn delete_session(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    state.identity.delete_session(&token).await;
    StatusCode::NO_CONTENT.into_response()
}
