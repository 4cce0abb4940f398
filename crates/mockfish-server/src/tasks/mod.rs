//! Asynchronous task tracking and execution.

pub mod dispatch;
pub mod model;
pub mod store;

pub use dispatch::{DispatchConfig, DispatchError, TaskDispatcher, TaskJob};
pub use model::{TaskPayload, TaskRecord, TaskState};
pub use store::{TaskError, TaskStore};
