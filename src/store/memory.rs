//! Process-local repository used by the unit and route tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{TaskRepository, UserRepository};
use crate::error::AppError;
use crate::models::task::timestamp_now;
use crate::models::{NewTask, Task, TaskPatch, User};

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<String, User>,
    tasks: BTreeMap<i64, Task>,
    last_task_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }
}

impl Inner {
    fn owned_task_mut(&mut self, owner_id: Uuid, task_id: i64) -> Option<&mut Task> {
        self.tasks
            .get_mut(&task_id)
            .filter(|task| task.owner_id == owner_id)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut inner = self.lock()?;
        if inner.users.contains_key(username) {
            return Err(AppError::DuplicateUsername);
        }
        let now = timestamp_now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(username.to_string(), user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.lock()?.users.get(username).cloned())
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn insert_task(&self, owner_id: Uuid, task: &NewTask) -> Result<Task, AppError> {
        let mut inner = self.lock()?;
        inner.last_task_id += 1;
        let now = timestamp_now();
        let created = Task {
            id: inner.last_task_id,
            owner_id,
            title: task.title.clone(),
            description: task.description.clone(),
            completed: false,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_tasks(&self, owner_id: Uuid) -> Result<Vec<Task>, AppError> {
        let inner = self.lock()?;
        // Ids grow with insertion order, so reverse id order is newest first.
        Ok(inner
            .tasks
            .values()
            .rev()
            .filter(|task| task.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_task(&self, owner_id: Uuid, task_id: i64) -> Result<Option<Task>, AppError> {
        let inner = self.lock()?;
        Ok(inner
            .tasks
            .get(&task_id)
            .filter(|task| task.owner_id == owner_id)
            .cloned())
    }

    async fn update_task(
        &self,
        owner_id: Uuid,
        task_id: i64,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        let mut inner = self.lock()?;
        Ok(inner.owned_task_mut(owner_id, task_id).map(|task| {
            task.apply_patch(patch);
            task.clone()
        }))
    }

    async fn toggle_task(&self, owner_id: Uuid, task_id: i64) -> Result<Option<Task>, AppError> {
        let mut inner = self.lock()?;
        Ok(inner.owned_task_mut(owner_id, task_id).map(|task| {
            task.toggle_completion();
            task.clone()
        }))
    }

    async fn delete_task(&self, owner_id: Uuid, task_id: i64) -> Result<bool, AppError> {
        let mut inner = self.lock()?;
        if inner.owned_task_mut(owner_id, task_id).is_none() {
            return Ok(false);
        }
        Ok(inner.tasks.remove(&task_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: None,
        }
    }

    #[actix_rt::test]
    async fn test_duplicate_username_is_rejected() {
        let store = MemoryStore::new();
        store.insert_user("alice", "hash").await.unwrap();

        let err = store.insert_user("alice", "other").await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));
        // Lookups are case-sensitive.
        assert!(store.find_by_username("Alice").await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_tasks_are_scoped_to_their_owner() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let task = store.insert_task(alice, &new_task("alice's")).await.unwrap();

        assert!(store.find_task(bob, task.id).await.unwrap().is_none());
        assert!(store.toggle_task(bob, task.id).await.unwrap().is_none());
        assert!(!store.delete_task(bob, task.id).await.unwrap());
        assert!(store.list_tasks(bob).await.unwrap().is_empty());

        assert_eq!(store.find_task(alice, task.id).await.unwrap(), Some(task));
    }

    #[actix_rt::test]
    async fn test_ids_are_never_reused() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let first = store.insert_task(owner, &new_task("one")).await.unwrap();
        assert!(store.delete_task(owner, first.id).await.unwrap());

        let second = store.insert_task(owner, &new_task("two")).await.unwrap();
        assert!(second.id > first.id);
    }
}
