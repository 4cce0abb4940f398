//! Resource actions: `GET` describes an action, `POST` invokes it.
//!
//! Invocation validates the body before anything is created, then hands the
//! work to the task dispatcher and answers `202 Accepted` with the task
//! monitor in `Location`.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use mockfish_core::actions::{ActionSpec, find_action};
use mockfish_core::resources::{ResourceKind, odata_id};
use tracing::info;

use super::inventory::type_name;
use crate::server::respond::{accepted, conditional_json, json_object};
use crate::server::{ApiError, AppState};
use crate::tasks::{TaskJob, TaskPayload};

const fn label(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::ComputerSystem => "Computer system",
        ResourceKind::Chassis => "Chassis",
        ResourceKind::Manager => "Manager",
        ResourceKind::Role => "Role",
        ResourceKind::RegistryFile => "Registry",
    }
}

/// Resolve the target resource and action, failing with 404 for an unknown
/// resource and `ActionNotSupported` for an unknown action.
fn lookup(kind: ResourceKind, id: &str, action: &str) -> Result<(String, &'static ActionSpec), ApiError> {
    if !kind.contains(id) {
        return Err(ApiError::ResourceNotFound(type_name(kind).into()));
    }
    let resource_uri = odata_id(&kind.member_path(id));
    let spec = find_action(kind, action).ok_or_else(|| ApiError::ActionNotSupported {
        action: action.to_string(),
        resource: resource_uri.clone(),
    })?;
    Ok((resource_uri, spec))
}

fn describe(kind: ResourceKind, id: &str, action: &str, headers: &HeaderMap) -> Result<Response, ApiError> {
    let (resource_uri, spec) = lookup(kind, id, action)?;
    conditional_json(headers, &spec.action_info(&resource_uri))
}

async fn invoke(
    state: &AppState,
    kind: ResourceKind,
    id: &str,
    action: &str,
    body: &Bytes,
) -> Result<Response, ApiError> {
    let (resource_uri, spec) = lookup(kind, id, action)?;
    let body = json_object(body, true)?;
    let parameters = spec.validate(&body)?;

    let job = TaskJob::Reset {
        label: format!("{} {id}", label(kind)),
        reset_type: parameters.get("ResetType").unwrap_or_default().to_string(),
        resource_uri: resource_uri.clone(),
    };
    let payload =
        TaskPayload::new("POST", spec.target(&resource_uri)).with_json_body(&parameters.to_json());
    let task = state.dispatcher.submit(job, payload).await?;

    info!(
        action = spec.name,
        resource = %resource_uri,
        task_id = %task.id,
        "Action accepted"
    );
    accepted(&task.uri(), &task.to_reference())
}

/// `GET /redfish/v1/Systems/{id}/Actions/{action}`
pub async fn system_action_info(
    Path((id, action)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    describe(ResourceKind::ComputerSystem, &id, &action, &headers)
}

/// `POST /redfish/v1/Systems/{id}/Actions/{action}`
pub async fn invoke_system_action(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response, ApiError> {
    invoke(&state, ResourceKind::ComputerSystem, &id, &action, &body).await
}

/// `GET /redfish/v1/Chassis/{id}/Actions/{action}`
pub async fn chassis_action_info(
    Path((id, action)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    describe(ResourceKind::Chassis, &id, &action, &headers)
}

/// `POST /redfish/v1/Chassis/{id}/Actions/{action}`
pub async fn invoke_chassis_action(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response, ApiError> {
    invoke(&state, ResourceKind::Chassis, &id, &action, &body).await
}

/// `GET /redfish/v1/Managers/{id}/Actions/{action}`
pub async fn manager_action_info(
    Path((id, action)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    describe(ResourceKind::Manager, &id, &action, &headers)
}

/// `POST /redfish/v1/Managers/{id}/Actions/{action}`
pub async fn invoke_manager_action(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response, ApiError> {
    invoke(&state, ResourceKind::Manager, &id, &action, &body).await
}
