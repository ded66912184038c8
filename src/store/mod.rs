//! Persistence seam.
//!
//! Handlers never talk to the database directly: the credential and task
//! stores depend on these traits, and the process wires in [`PgStore`] at
//! startup. Every task method takes the owner id and filters on
//! `(id, owner_id)` jointly, so a task owned by someone else is
//! indistinguishable from one that does not exist.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskPatch, User};

pub use postgres::PgStore;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user. A taken username yields `AppError::DuplicateUsername`.
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, AppError>;

    /// Exact, case-sensitive lookup.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert_task(&self, owner_id: Uuid, task: &NewTask) -> Result<Task, AppError>;

    /// Newest first.
    async fn list_tasks(&self, owner_id: Uuid) -> Result<Vec<Task>, AppError>;

    async fn find_task(&self, owner_id: Uuid, task_id: i64) -> Result<Option<Task>, AppError>;

    /// Applies a validated patch atomically. `None` when no such owned task exists.
    async fn update_task(
        &self,
        owner_id: Uuid,
        task_id: i64,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, AppError>;

    /// Flips `completed` atomically. `None` when no such owned task exists.
    async fn toggle_task(&self, owner_id: Uuid, task_id: i64) -> Result<Option<Task>, AppError>;

    /// Returns whether a row was deleted.
    async fn delete_task(&self, owner_id: Uuid, task_id: i64) -> Result<bool, AppError>;
}
