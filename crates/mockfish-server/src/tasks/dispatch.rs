//! Bounded worker pool that drives accepted actions to completion.
//!
//! Handlers [`submit`](TaskDispatcher::submit) a [`TaskJob`]; the job is
//! queued on a bounded channel and a dispatcher loop hands each one to a
//! detached worker once a [`Semaphore`] permit is free. Workers step their
//! task through `New -> Running -> Completed` and publish lifecycle events.

use std::sync::Arc;
use std::time::Duration;

use mockfish_core::resources::{Health, Link, Message};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tracing::{debug, info, warn};

use super::model::{TaskPayload, TaskRecord, TaskState, task_uri};
use super::store::{TaskError, TaskStore};
use crate::events::EventBus;

const DEFAULT_WORKERS: usize = 4;
const DEFAULT_QUEUE_CAPACITY: usize = 64;
const PROGRESS_MIDPOINT: u8 = 50;

#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    /// Pause before each task step.
    pub step_delay: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            step_delay: Duration::from_millis(1500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("Task queue is full")]
    QueueFull,

    #[error("Task dispatcher has shut down")]
    Closed,
}

/// Work carried out by a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskJob {
    /// A reset of the resource at `resource_uri`, described as `label`
    /// (e.g. `Computer system 1`) in task messages.
    Reset {
        resource_uri: String,
        label: String,
        reset_type: String,
    },
    /// A client-created task with no side effects.
    Generic,
}

impl TaskJob {
    /// Resource the job acts on, if any.
    pub fn resource_uri(&self) -> Option<&str> {
        match self {
            Self::Reset { resource_uri, .. } => Some(resource_uri),
            Self::Generic => None,
        }
    }

    fn completion_message(&self) -> Message {
        match self {
            Self::Reset {
                label, reset_type, ..
            } => Message::success(format!(
                "{label} reset ({reset_type}) completed successfully"
            )),
            Self::Generic => Message::success("Task completed successfully"),
        }
    }
}

struct QueuedJob {
    task_id: String,
    job: TaskJob,
}

/// Cloneable handle for submitting jobs.
#[derive(Clone)]
pub struct TaskDispatcher {
    tx: mpsc::Sender<QueuedJob>,
    store: Arc<TaskStore>,
}

impl TaskDispatcher {
    /// Start the dispatcher loop. Must be called inside a Tokio runtime.
    pub fn spawn(store: Arc<TaskStore>, events: EventBus, config: DispatchConfig) -> Self {
        let workers = if config.workers == 0 {
            DEFAULT_WORKERS
        } else {
            config.workers
        };
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let semaphore = Arc::new(Semaphore::new(workers));

        info!(
            workers,
            queue_capacity = config.queue_capacity,
            step_delay_ms = u64::try_from(config.step_delay.as_millis()).unwrap_or(u64::MAX),
            "Task dispatcher started"
        );

        let worker = Worker {
            store: Arc::clone(&store),
            events,
            step_delay: config.step_delay,
        };
        tokio::spawn(dispatch_loop(rx, semaphore, worker));

        Self { tx, store }
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    /// Create a task for `job` and queue it.
    ///
    /// Queue capacity is reserved first, so a full queue fails without
    /// leaving a task behind.
    pub async fn submit(&self, job: TaskJob, payload: TaskPayload) -> Result<TaskRecord, DispatchError> {
        let permit = self.tx.try_reserve().map_err(|e| match e {
            mpsc::error::TrySendError::Full(()) => DispatchError::QueueFull,
            mpsc::error::TrySendError::Closed(()) => DispatchError::Closed,
        })?;
        let task = self.store.create(payload).await;
        permit.send(QueuedJob {
            task_id: task.id.clone(),
            job,
        });
        Ok(task)
    }
}

async fn dispatch_loop(
    mut rx: mpsc::Receiver<QueuedJob>,
    semaphore: Arc<Semaphore>,
    worker: Worker,
) {
    while let Some(queued) = rx.recv().await {
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };
        let worker = worker.clone();
        tokio::spawn(async move {
            worker.run(queued, permit).await;
        });
    }
    debug!("Task dispatcher loop exited");
}

#[derive(Clone)]
struct Worker {
    store: Arc<TaskStore>,
    events: EventBus,
    step_delay: Duration,
}

impl Worker {
    async fn run(&self, queued: QueuedJob, _permit: OwnedSemaphorePermit) {
        let QueuedJob { task_id, job } = queued;
        match self.step(&task_id, &job).await {
            Ok(true) => info!(
                task_id = %task_id,
                resource = job.resource_uri().unwrap_or("-"),
                "Task completed"
            ),
            Ok(false) => debug!(task_id = %task_id, "Task removed before completion"),
            Err(e) => warn!(task_id = %task_id, error = %e, "Task worker stopped"),
        }
    }

    /// Returns `Ok(false)` as soon as the task is found missing.
    async fn step(&self, task_id: &str, job: &TaskJob) -> Result<bool, TaskError> {
        tokio::time::sleep(self.step_delay).await;
        if !self.store.start(task_id).await? {
            return Ok(false);
        }
        self.publish(task_id, "TaskStarted", "has started").await;

        if !self
            .store
            .set_percent_complete(task_id, PROGRESS_MIDPOINT)
            .await?
        {
            return Ok(false);
        }
        self.publish(
            task_id,
            "TaskProgressChanged",
            "has changed to progress 50 percent complete",
        )
        .await;

        tokio::time::sleep(self.step_delay).await;
        if !self
            .store
            .finish(task_id, TaskState::Completed, job.completion_message())
            .await?
        {
            return Ok(false);
        }
        self.publish(task_id, "TaskCompletedOK", "has completed").await;
        Ok(true)
    }

    async fn publish(&self, task_id: &str, key: &str, what: &str) {
        let mut message = Message::new(
            format!("TaskEvent.1.0.{key}"),
            format!("The task with Id '{task_id}' {what}."),
            Health::Ok,
            "None.",
        );
        message.message_args = vec![task_id.to_string()];
        self.events
            .publish(message, Some(Link::new(task_uri(task_id))), Some("Task"))
            .await;
    }
}
