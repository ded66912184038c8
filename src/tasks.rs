use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskInput, TaskPatch};
use crate::store::TaskRepository;

/// Owner-scoped task operations.
///
/// Input is validated before anything is persisted, and every lookup is
/// keyed by `(owner_id, task_id)`: a task belonging to another owner
/// behaves exactly like a missing one.
#[derive(Clone)]
pub struct TaskStore {
    tasks: Arc<dyn TaskRepository>,
}

impl TaskStore {
    pub fn new(tasks: Arc<dyn TaskRepository>) -> Self {
        Self { tasks }
    }

    pub async fn create(&self, owner_id: Uuid, input: TaskInput) -> Result<Task, AppError> {
        input.validate()?;
        self.tasks.insert_task(owner_id, &NewTask::from(input)).await
    }

    /// Newest first.
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Task>, AppError> {
        self.tasks.list_tasks(owner_id).await
    }

    pub async fn get(&self, owner_id: Uuid, task_id: i64) -> Result<Task, AppError> {
        self.tasks
            .find_task(owner_id, task_id)
            .await?
            .ok_or_else(AppError::task_not_found)
    }

    pub async fn update(
        &self,
        owner_id: Uuid,
        task_id: i64,
        patch: TaskPatch,
    ) -> Result<Task, AppError> {
        patch.validate()?;
        self.tasks
            .update_task(owner_id, task_id, &patch)
            .await?
            .ok_or_else(AppError::task_not_found)
    }

    pub async fn delete(&self, owner_id: Uuid, task_id: i64) -> Result<(), AppError> {
        if self.tasks.delete_task(owner_id, task_id).await? {
            Ok(())
        } else {
            Err(AppError::task_not_found())
        }
    }

    pub async fn toggle_completion(&self, owner_id: Uuid, task_id: i64) -> Result<Task, AppError> {
        self.tasks
            .toggle_task(owner_id, task_id)
            .await?
            .ok_or_else(AppError::task_not_found)
    }
}
