use std::time::Duration;

use async_trait::async_trait;
use log::info;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use super::{TaskRepository, UserRepository};
use crate::config::Config;
use crate::error::AppError;
use crate::models::task::timestamp_now;
use crate::models::{NewTask, Task, TaskPatch, User};

/// Postgres-backed implementation of both repositories.
///
/// Owns the connection pool: created once at process start by [`PgStore::connect`]
/// and closed by [`PgStore::close`] at shutdown.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Creates the `users` and `tasks` tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("database migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let now = timestamp_now();
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, password_hash, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING id, username, password_hash, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            // Lost a registration race against the same username.
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::DuplicateUsername)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at, updated_at
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl TaskRepository for PgStore {
    async fn insert_task(&self, owner_id: Uuid, task: &NewTask) -> Result<Task, AppError> {
        let now = timestamp_now();
        let mut tx = self.pool.begin().await?;
        let created = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (owner_id, title, description, completed, created_at, updated_at)
             VALUES ($1, $2, $3, FALSE, $4, $4)
             RETURNING id, owner_id, title, description, completed, created_at, updated_at",
        )
        .bind(owner_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn list_tasks(&self, owner_id: Uuid) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, owner_id, title, description, completed, created_at, updated_at
             FROM tasks WHERE owner_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn find_task(&self, owner_id: Uuid, task_id: i64) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT id, owner_id, title, description, completed, created_at, updated_at
             FROM tasks WHERE id = $1 AND owner_id = $2",
        )
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn update_task(
        &self,
        owner_id: Uuid,
        task_id: i64,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        let mut tx = self.pool.begin().await?;
        let Some(mut task) = lock_task(&mut tx, owner_id, task_id).await? else {
            return Ok(None);
        };
        task.apply_patch(patch);
        let updated = write_task(&mut tx, &task).await?;
        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn toggle_task(&self, owner_id: Uuid, task_id: i64) -> Result<Option<Task>, AppError> {
        let mut tx = self.pool.begin().await?;
        let Some(mut task) = lock_task(&mut tx, owner_id, task_id).await? else {
            return Ok(None);
        };
        task.toggle_completion();
        let updated = write_task(&mut tx, &task).await?;
        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete_task(&self, owner_id: Uuid, task_id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(task_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

type PgTransaction = sqlx::Transaction<'static, sqlx::Postgres>;

/// Reads the owned row under `FOR UPDATE`, so concurrent read-modify-write
/// cycles on the same task are serialised.
async fn lock_task(
    tx: &mut PgTransaction,
    owner_id: Uuid,
    task_id: i64,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        "SELECT id, owner_id, title, description, completed, created_at, updated_at
         FROM tasks WHERE id = $1 AND owner_id = $2
         FOR UPDATE",
    )
    .bind(task_id)
    .bind(owner_id)
    .fetch_optional(&mut **tx)
    .await
}

async fn write_task(tx: &mut PgTransaction, task: &Task) -> Result<Task, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        "UPDATE tasks
         SET title = $1, description = $2, completed = $3, updated_at = $4
         WHERE id = $5 AND owner_id = $6
         RETURNING id, owner_id, title, description, completed, created_at, updated_at",
    )
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.completed)
    .bind(task.updated_at)
    .bind(task.id)
    .bind(task.owner_id)
    .fetch_one(&mut **tx)
    .await
}
