//! Systems, Chassis and Managers collections and members.
//!
//! Also hosts the query-aware helpers reused by other statically projected
//! resources (roles, registries).

use axum::extract::Path;
use axum::http::HeaderMap;
use axum::response::Response;
use mockfish_core::resources::{self, ResourceKind};

use crate::server::ApiError;
use crate::server::respond::{ODataQuery, conditional_json};

pub(crate) const fn type_name(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::ComputerSystem => "ComputerSystem",
        ResourceKind::Chassis => "Chassis",
        ResourceKind::Manager => "Manager",
        ResourceKind::Role => "Role",
        ResourceKind::RegistryFile => "MessageRegistryFile",
    }
}

/// Render `kind`'s collection with `$filter`, `$skip` and `$top` applied.
pub(crate) fn collection(kind: ResourceKind, query: &ODataQuery, headers: &HeaderMap) -> Result<Response, ApiError> {
    let collection = query
        .0
        .apply_to_collection(kind.collection(), kind, resources::resolve);
    conditional_json(headers, &collection)
}

/// Render member `id` of `kind` with `$expand` and `$select` applied.
pub(crate) fn member(
    kind: ResourceKind,
    id: &str,
    query: &ODataQuery,
    headers: &HeaderMap,
) -> Result<Response, ApiError> {
    let document = kind
        .project(id)
        .ok_or_else(|| ApiError::ResourceNotFound(type_name(kind).into()))?;
    let document = query.0.apply_to_document(document, kind, resources::resolve);
    conditional_json(headers, &document)
}

/// `GET /redfish/v1/Systems`
pub async fn list_systems(query: ODataQuery, headers: HeaderMap) -> Result<Response, ApiError> {
    collection(ResourceKind::ComputerSystem, &query, &headers)
}

/// `GET /redfish/v1/Systems/{id}`
pub async fn get_system(Path(id): Path<String>, query: ODataQuery, headers: HeaderMap) -> Result<Response, ApiError> {
    member(ResourceKind::ComputerSystem, &id, &query, &headers)
}

/// `GET /redfish/v1/Chassis`
pub async fn list_chassis(query: ODataQuery, headers: HeaderMap) -> Result<Response, ApiError> {
    collection(ResourceKind::Chassis, &query, &headers)
}

/// `GET /redfish/v1/Chassis/{id}`
pub async fn get_chassis(Path(id): Path<String>, query: ODataQuery, headers: HeaderMap) -> Result<Response, ApiError> {
    member(ResourceKind::Chassis, &id, &query, &headers)
}

/// `GET /redfish/v1/Managers`
pub async fn list_managers(query: ODataQuery, headers: HeaderMap) -> Result<Response, ApiError> {
    collection(ResourceKind::Manager, &query, &headers)
}

/// `GET /redfish/v1/Managers/{id}`
pub async fn get_manager(Path(id): Path<String>, query: ODataQuery, headers: HeaderMap) -> Result<Response, ApiError> {
    member(ResourceKind::Manager, &id, &query, &headers)
}
