//! Service entry points and static protocol documents.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use mockfish_core::resources::service::{
    METADATA_XML, OPENAPI_YAML, odata_service_document, protocol_versions, service_root as root_document,
};
use serde_json::json;

use crate::server::respond::{conditional_json, conditional_text};
use crate::server::{ApiError, AppState};

/// `GET /health`
pub async fn health(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    conditional_json(
        &headers,
        &json!({"status": "ok", "service": state.settings.service_name}),
    )
}

/// `GET /redfish`
pub async fn versions(headers: HeaderMap) -> Result<Response, ApiError> {
    conditional_json(&headers, &protocol_versions())
}

/// `GET /redfish/v1`
pub async fn service_root(headers: HeaderMap) -> Result<Response, ApiError> {
    conditional_json(&headers, &root_document())
}

/// `GET /redfish/v1/$metadata`
pub async fn metadata(headers: HeaderMap) -> Response {
    conditional_text(&headers, "application/xml;charset=utf-8", METADATA_XML)
}

/// `GET /redfish/v1/odata`
pub async fn odata(headers: HeaderMap) -> Result<Response, ApiError> {
    conditional_json(&headers, &odata_service_document())
}

/// `GET /redfish/v1/openapi.yaml`
pub async fn openapi(headers: HeaderMap) -> Response {
    conditional_text(&headers, "application/yaml", OPENAPI_YAML)
}
