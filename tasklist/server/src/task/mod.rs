use crate::store::{StoreError, TaskRepository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::ToSchema;

pub mod api;

pub use api::{TaskState, create_task_router};

/// A single entry of the task list.
#[derive(Debug, PartialEq, Clone, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Task {
    /// Creation timestamp in milliseconds since the UNIX epoch, unique within the store
    id: i64,
    /// Non-empty description of the task
    title: String,
    /// Whether the task has been done
    completed: bool,
}

impl Task {
    pub fn new(id: i64, title: String, completed: bool) -> Self {
        Self {
            id,
            title,
            completed,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the title of the task.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns whether the task is completed.
    pub fn completed(&self) -> bool {
        self.completed
    }
}

/// Partial update of a task. Only the fields that are `Some` are overwritten.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// The task title was absent or empty.
    #[error("Task title is required")]
    MissingTitle,
    /// No task with the given ID exists.
    #[error("Task with ID {0} not found")]
    TaskNotFound(i64),
    /// The task document could not be read or written.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Owns every read-modify-write cycle against the task store.
///
/// Each call reloads the document, so changes made to the file between requests
/// are always picked up. Calls are serialized so that two concurrent mutations
/// cannot overwrite each other.
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
    lock: Mutex<()>,
}

impl TaskService {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self {
            repository,
            lock: Mutex::new(()),
        }
    }

    /// Retrieves all tasks in store order.
    #[tracing::instrument(skip(self))]
    pub async fn list_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        let _guard = self.lock.lock().await;
        let document = self.repository.load().await?;
        Ok(document.tasks)
    }

    /// Retrieves the task with the given ID.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Task` if it exists, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn get_task(&self, id: i64) -> Result<Task, TaskServiceError> {
        let _guard = self.lock.lock().await;
        let document = self.repository.load().await?;
        document
            .tasks
            .into_iter()
            .find(|task| task.id == id)
            .ok_or(TaskServiceError::TaskNotFound(id))
    }

    /// Creates a new, not yet completed task and appends it to the store.
    ///
    /// # Arguments
    ///
    /// * `title` - The title of the task. Absent or empty titles are rejected.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, title: Option<String>) -> Result<Task, TaskServiceError> {
        let title = match title {
            Some(title) if !title.is_empty() => title,
            _ => return Err(TaskServiceError::MissingTitle),
        };

        let _guard = self.lock.lock().await;
        let mut document = self.repository.load().await?;
        let id = next_task_id(&document.tasks, chrono::Utc::now().timestamp_millis());
        let task = Task::new(id, title, false);
        document.tasks.push(task.clone());
        self.repository.save(&document).await?;
        tracing::info!("Created task {}", id);
        Ok(task)
    }

    /// Overwrites the fields present in `update` on the task with the given ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to update.
    /// * `update` - The fields to replace.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn update_task(
        &self,
        id: i64,
        update: TaskUpdate,
    ) -> Result<Task, TaskServiceError> {
        let _guard = self.lock.lock().await;
        let mut document = self.repository.load().await?;
        let task = document
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        if let Some(title) = update.title {
            if title.is_empty() {
                return Err(TaskServiceError::MissingTitle);
            }
            task.title = title;
        }
        if let Some(completed) = update.completed {
            task.completed = completed;
        }

        let updated = task.clone();
        self.repository.save(&document).await?;
        Ok(updated)
    }

    /// Removes the task with the given ID from the store.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, id: i64) -> Result<(), TaskServiceError> {
        let _guard = self.lock.lock().await;
        let mut document = self.repository.load().await?;
        let initial_len = document.tasks.len();
        document.tasks.retain(|task| task.id != id);

        if document.tasks.len() == initial_len {
            return Err(TaskServiceError::TaskNotFound(id));
        }

        self.repository.save(&document).await?;
        tracing::info!("Deleted task {}", id);
        Ok(())
    }
}

/// Picks the ID for a new task: the current time in milliseconds, moved past the
/// largest existing ID when the clock has not advanced beyond it.
fn next_task_id(tasks: &[Task], now_millis: i64) -> i64 {
    match tasks.iter().map(Task::id).max() {
        Some(max_id) if max_id >= now_millis => max_id + 1,
        _ => now_millis,
    }
}
