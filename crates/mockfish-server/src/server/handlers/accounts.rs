//! AccountService: accounts projected from the credential store, and roles.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use mockfish_core::resources::ResourceKind;
use mockfish_core::resources::account::{account_service as account_service_document, accounts_collection, manager_account};

use super::inventory::{collection, member};
use crate::server::respond::{ODataQuery, conditional_json};
use crate::server::{ApiError, AppState};

pub async fn account_service(headers: HeaderMap) -> Result<Response, ApiError> {
    conditional_json(&headers, &account_service_document())
}

pub async fn list_accounts(
    State(state): State<AppState>,
    ODataQuery(query): ODataQuery,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let identities = state.identity.list_identities();
    let mut accounts = accounts_collection(identities.iter().map(|i| i.username.as_str()));
    let members = std::mem::take(&mut accounts.members);
    accounts.set_members(query.paginate(members));
    conditional_json(&headers, &accounts)
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let identity = state
        .identity
        .identity(&id)
        .ok_or_else(|| ApiError::ResourceNotFound("ManagerAccount".into()))?;
    conditional_json(
        &headers,
        &manager_account(&identity.username, &identity.role, identity.enabled),
    )
}

pub async fn list_roles(query: ODataQuery, headers: HeaderMap) -> Result<Response, ApiError> {
    collection(ResourceKind::Role, &query, &headers)
}

pub async fn get_role(Path(id): Path<String>, query: ODataQuery, headers: HeaderMap) -> Result<Response, ApiError> {
    member(ResourceKind::Role, &id, &query, &headers)
}
