//! Message registry files and their content.

use axum::extract::Path;
use axum::http::HeaderMap;
use axum::response::Response;
use mockfish_core::resources::ResourceKind;
use mockfish_core::resources::registry::message_registry;

use super::inventory::{collection, member};
use crate::server::respond::{ODataQuery, conditional_json};
use crate::server::ApiError;

/// `GET /redfish/v1/Registries`
pub async fn list_registries(query: ODataQuery, headers: HeaderMap) -> Result<Response, ApiError> {
    collection(ResourceKind::RegistryFile, &query, &headers)
}

/// `GET /redfish/v1/Registries/{id}`. An id ending in `.json` serves the
/// registry content instead of the file descriptor.
pub async fn get_registry(Path(id): Path<String>, query: ODataQuery, headers: HeaderMap) -> Result<Response, ApiError> {
    match id.strip_suffix(".json") {
        Some(registry_id) => {
            let registry = message_registry(registry_id)
                .ok_or_else(|| ApiError::ResourceNotFound("MessageRegistry".into()))?;
            conditional_json(&headers, &registry)
        }
        None => member(ResourceKind::RegistryFile, &id, &query, &headers),
    }
}
