//! Task records and their Redfish documents.

use chrono::{DateTime, SecondsFormat, Utc};
use mockfish_core::resources::{Collection, Header, Health, Link, Message, odata_id};
use serde::Serialize;

pub const TASKS_PATH: &str = "TaskService/Tasks";

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskState {
    New,
    Running,
    Completed,
    Exception,
    Cancelled,
}

impl TaskState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Exception | Self::Cancelled)
    }

    /// `New -> Running -> {Completed, Exception, Cancelled}`; nothing else.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::New, Self::Running)
                | (
                    Self::Running,
                    Self::Completed | Self::Exception | Self::Cancelled
                )
        )
    }
}

/// The request that spawned a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskPayload {
    pub target_uri: String,
    pub http_operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_body: Option<String>,
}

impl TaskPayload {
    pub fn new(http_operation: &str, target_uri: impl Into<String>) -> Self {
        Self {
            target_uri: target_uri.into(),
            http_operation: http_operation.to_string(),
            json_body: None,
        }
    }

    #[must_use]
    pub fn with_json_body(mut self, body: &serde_json::Value) -> Self {
        self.json_body = Some(body.to_string());
        self
    }
}

/// A tracked unit of asynchronous work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: String,
    pub state: TaskState,
    pub status: Health,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub percent_complete: u8,
    pub messages: Vec<Message>,
    pub payload: TaskPayload,
}

impl TaskRecord {
    pub fn new(id: String, payload: TaskPayload, now: DateTime<Utc>) -> Self {
        Self {
            id,
            state: TaskState::New,
            status: Health::Ok,
            start_time: now,
            end_time: None,
            percent_complete: 0,
            messages: Vec::new(),
            payload,
        }
    }

    pub fn uri(&self) -> String {
        task_uri(&self.id)
    }

    pub fn name(&self) -> String {
        format!("Task {}", self.id)
    }

    pub fn to_document(&self) -> TaskDocument {
        TaskDocument {
            header: Header::new("Task", "v1_7_4", self.uri(), &self.id, self.name()),
            task_state: self.state,
            task_status: self.status,
            start_time: rfc3339(self.start_time),
            end_time: self.end_time.map(rfc3339),
            percent_complete: self.percent_complete,
            messages: self.messages.clone(),
            payload: self.payload.clone(),
        }
    }

    /// Minimal body returned when an action is accepted.
    pub fn to_reference(&self) -> TaskReference {
        TaskReference {
            odata_id: self.uri(),
            odata_type: "#Task.v1_7_4.Task",
            id: self.id.clone(),
            name: self.name(),
        }
    }
}

pub fn task_uri(id: &str) -> String {
    odata_id(&format!("{TASKS_PATH}/{id}"))
}

pub fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskDocument {
    #[serde(flatten)]
    pub header: Header,
    pub task_state: TaskState,
    pub task_status: Health,
    pub start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub percent_complete: u8,
    pub messages: Vec<Message>,
    pub payload: TaskPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskReference {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
    #[serde(rename = "@odata.type")]
    pub odata_type: &'static str,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

pub fn tasks_collection(tasks: &[TaskRecord]) -> Collection {
    Collection::new(
        "TaskCollection",
        TASKS_PATH,
        "Task Collection",
        tasks.iter().map(|t| Link::new(t.uri())).collect(),
    )
}
