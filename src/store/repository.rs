use std::sync::Arc;

use super::{DocumentStore, StoreError, TASKS, USERS};
use crate::models::{Task, User};

/// Credential lookups keyed by username.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        match self.store.get(USERS, username).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Stores a new user. Returns `false` if the username is already registered.
    pub async fn create(&self, user: &User) -> Result<bool, StoreError> {
        let doc = serde_json::to_value(user)?;
        self.store.put_if_absent(USERS, &user.username, doc).await
    }
}

/// Task documents keyed by task id, filterable by owner.
#[derive(Clone)]
pub struct TaskRepository {
    store: Arc<dyn DocumentStore>,
}

impl TaskRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn scan_by_owner(&self, owner: &str) -> Result<Vec<Task>, StoreError> {
        self.store
            .scan_eq(TASKS, "userId", owner)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
            .collect()
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Task>, StoreError> {
        match self.store.get(TASKS, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn put(&self, task: &Task) -> Result<(), StoreError> {
        let doc = serde_json::to_value(task)?;
        self.store.put(TASKS, &task.id, doc).await
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete(TASKS, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskInput;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn task(owner: &str, title: &str) -> Task {
        Task::new(
            TaskInput {
                title: title.into(),
                description: String::new(),
                icon: String::new(),
            },
            owner,
        )
    }

    #[actix_rt::test]
    async fn test_users_are_created_once() {
        let users = UserRepository::new(Arc::new(MemoryStore::new()));
        let alice = User::new("alice".into(), "Alice".into(), "hash".into());

        assert!(users.create(&alice).await.unwrap());
        let impostor = User::new("alice".into(), "Mallory".into(), "other".into());
        assert!(!users.create(&impostor).await.unwrap());

        assert_eq!(users.get_by_username("alice").await.unwrap(), Some(alice));
        assert_eq!(users.get_by_username("bob").await.unwrap(), None);
    }

    #[actix_rt::test]
    async fn test_tasks_scan_by_owner() {
        let tasks = TaskRepository::new(Arc::new(MemoryStore::new()));
        let a1 = task("alice", "one");
        let b1 = task("bob", "two");
        tasks.put(&a1).await.unwrap();
        tasks.put(&b1).await.unwrap();

        assert_eq!(tasks.scan_by_owner("alice").await.unwrap(), vec![a1.clone()]);
        assert_eq!(tasks.get_by_id(&b1.id).await.unwrap(), Some(b1.clone()));

        assert!(tasks.delete_by_id(&a1.id).await.unwrap());
        assert!(tasks.scan_by_owner("alice").await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_corrupt_document_is_a_codec_error() {
        let store = Arc::new(MemoryStore::new());
        store
            .put(TASKS, "bad", serde_json::json!({"id": 5}))
            .await
            .unwrap();
        let tasks = TaskRepository::new(store);
        assert!(matches!(tasks.get_by_id("bad").await, Err(StoreError::Codec(_))));
    }
}
