//! In-memory task store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use mockfish_core::resources::{Health, Message};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::model::{TaskPayload, TaskRecord, TaskState};

/// Highest percentage a task reports before it completes.
const MAX_PERCENT_WHILE_ACTIVE: u8 = 99;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("Task {id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        id: String,
        from: TaskState,
        to: TaskState,
    },

    #[error("Task {id} has already finished")]
    Finished { id: String },
}

/// Thread-safe registry of tasks.
///
/// Mutations on an unknown id are no-ops reported as `Ok(false)`, so workers
/// outliving a deleted task stop without side effects.
pub struct TaskStore {
    tasks: RwLock<HashMap<String, TaskRecord>>,
    next_id: AtomicU64,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new task in state `New`.
    pub async fn create(&self, payload: TaskPayload) -> TaskRecord {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        let task = TaskRecord::new(id.clone(), payload, Utc::now());
        self.tasks.write().await.insert(id.clone(), task.clone());
        info!(task_id = %id, target = %task.payload.target_uri, "Task created");
        task
    }

    pub async fn get(&self, id: &str) -> Option<TaskRecord> {
        self.tasks.read().await.get(id).cloned()
    }

    /// All tasks in creation order.
    pub async fn list(&self) -> Vec<TaskRecord> {
        let mut tasks: Vec<TaskRecord> = self.tasks.read().await.values().cloned().collect();
        tasks.sort_by_key(|t| t.id.parse::<u64>().unwrap_or(u64::MAX));
        tasks
    }

    pub async fn delete(&self, id: &str) -> bool {
        let removed = self.tasks.write().await.remove(id).is_some();
        if removed {
            info!(task_id = %id, "Task deleted");
        }
        removed
    }

    /// `New -> Running`.
    pub async fn start(&self, id: &str) -> Result<bool, TaskError> {
        self.update(id, |task| transition(task, TaskState::Running))
            .await
    }

    /// Record progress. Held below 100 until the task completes.
    pub async fn set_percent_complete(&self, id: &str, percent: u8) -> Result<bool, TaskError> {
        self.update(id, |task| {
            if task.state.is_terminal() {
                return Err(TaskError::Finished {
                    id: task.id.clone(),
                });
            }
            task.percent_complete = percent.min(MAX_PERCENT_WHILE_ACTIVE);
            Ok(())
        })
        .await
    }

    /// `Running -> terminal`, appending `message` to the task log.
    pub async fn finish(
        &self,
        id: &str,
        outcome: TaskState,
        message: Message,
    ) -> Result<bool, TaskError> {
        self.update(id, |task| {
            if !outcome.is_terminal() {
                return Err(TaskError::InvalidTransition {
                    id: task.id.clone(),
                    from: task.state,
                    to: outcome,
                });
            }
            transition(task, outcome)?;
            task.messages.push(message);
            Ok(())
        })
        .await
    }

    /// Delete finished tasks whose end time is before `cutoff`.
    pub async fn purge_finished_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, t| t.end_time.is_none_or(|end| end >= cutoff));
        before - tasks.len()
    }

    async fn update<F>(&self, id: &str, apply: F) -> Result<bool, TaskError>
    where
        F: FnOnce(&mut TaskRecord) -> Result<(), TaskError>,
    {
        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks.get_mut(id) else {
            debug!(task_id = %id, "Update of missing task ignored");
            return Ok(false);
        };
        apply(task)?;
        Ok(true)
    }
}

fn transition(task: &mut TaskRecord, next: TaskState) -> Result<(), TaskError> {
    if !task.state.can_transition_to(next) {
        return Err(TaskError::InvalidTransition {
            id: task.id.clone(),
            from: task.state,
            to: next,
        });
    }
    task.state = next;
    match next {
        TaskState::Completed => {
            task.percent_complete = 100;
            task.end_time = Some(Utc::now());
        }
        TaskState::Exception => {
            task.status = Health::Critical;
            task.end_time = Some(Utc::now());
        }
        TaskState::Cancelled => {
            task.status = Health::Warning;
            task.end_time = Some(Utc::now());
        }
        TaskState::New | TaskState::Running => {}
    }
    debug!(task_id = %task.id, state = ?next, "Task state changed");
    Ok(())
}
