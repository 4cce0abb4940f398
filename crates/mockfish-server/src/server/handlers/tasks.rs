//! TaskService: task monitors and the task collection.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use mockfish_core::resources::odata_id;
use mockfish_core::resources::service::task_service as task_service_document;
use serde_json::Value;

use crate::server::respond::{ODataQuery, conditional_json, created, json_object};
use crate::server::{ApiError, AppState};
use crate::tasks::model::{TASKS_PATH, rfc3339, tasks_collection};
use crate::tasks::{TaskJob, TaskPayload};

fn not_found() -> ApiError {
    ApiError::ResourceNotFound("Task".into())
}

/// `GET /redfish/v1/TaskService`
pub async fn task_service(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    conditional_json(
        &headers,
        &task_service_document(rfc3339(Utc::now()), state.settings.task_auto_delete_minutes),
    )
}

/// `GET /redfish/v1/TaskService/Tasks`
pub async fn list_tasks(
    State(state): State<AppState>,
    ODataQuery(query): ODataQuery,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let tasks = query.paginate(state.tasks.list().await);
    conditional_json(&headers, &tasks_collection(&tasks))
}

/// `POST /redfish/v1/TaskService/Tasks` creates a task with no side effects.
pub async fn create_task(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let body = json_object(&body, true)?;
    let mut payload = TaskPayload::new("POST", odata_id(TASKS_PATH));
    if !body.is_empty() {
        payload = payload.with_json_body(&Value::Object(body));
    }
    let task = state.dispatcher.submit(TaskJob::Generic, payload).await?;
    created(&task.uri(), &task.to_document())
}

/// `GET /redfish/v1/TaskService/Tasks/{id}`
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let task = state.tasks.get(&id).await.ok_or_else(not_found)?;
    conditional_json(&headers, &task.to_document())
}

/// `DELETE /redfish/v1/TaskService/Tasks/{id}`
pub async fn delete_task(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    if state.tasks.delete(&id).await {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(not_found())
    }
}
