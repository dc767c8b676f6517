use std::sync::Arc;

use chrono::Utc;
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use shared::{Role, Task};
use uuid::Uuid;

use crate::error::ApiError;

/// A registered account. Only ever exposed to the API as `{id, role}`
/// (via the bearer token) or as a resolved owner name on task listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub password_hash: String,
}

impl User {
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            // Admins are promoted out of band; registration never grants the role.
            role: Role::User,
            password_hash,
        }
    }
}

fn task_key(id: Uuid) -> String {
    format!("task:{}", id)
}

fn user_key(id: Uuid) -> String {
    format!("user:{}", id)
}

fn username_key(username: &str) -> String {
    format!("username:{}", username)
}

/// Tasks persisted as one JSON document per `task:{id}` key.
#[derive(Clone)]
pub struct TaskStore {
    client: Arc<Client>,
}

impl TaskStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    async fn conn(&self) -> Result<redis::aio::Connection, ApiError> {
        self.client.get_async_connection().await.map_err(Into::into)
    }

    /// Write a task, bumping `updated_at`. Used for both create and update;
    /// a single-document write, so there is no partial state on failure.
    pub async fn save(&self, task: &mut Task) -> Result<(), ApiError> {
        task.updated_at = Utc::now();
        let json = serde_json::to_string(task).map_err(|e| ApiError::Internal(e.to_string()))?;
        let mut conn = self.conn().await?;
        let _: () = conn.set(task_key(task.id), json).await?;
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Task>, ApiError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn.get(task_key(id)).await?;
        match raw {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| ApiError::Internal(e.to_string())),
            None => Ok(None),
        }
    }

    /// Physical delete. Returns false when the id was already absent.
    pub async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut conn = self.conn().await?;
        let deleted: usize = conn.del(task_key(id)).await?;
        Ok(deleted > 0)
    }

    /// One snapshot of every task. The list handlers filter and paginate
    /// this snapshot in-process, so the count and the page slice always
    /// agree within a single response. Across requests there is no
    /// isolation guarantee beyond Redis's read consistency.
    pub async fn all(&self) -> Result<Vec<Task>, ApiError> {
        let mut conn = self.conn().await?;
        let keys: Vec<String> = conn.keys("task:*").await?;
        let mut tasks = Vec::with_capacity(keys.len());
        for key in keys {
            let raw: Option<String> = conn.get(&key).await?;
            if let Some(json) = raw {
                if let Ok(task) = serde_json::from_str::<Task>(&json) {
                    tasks.push(task);
                }
            }
        }
        Ok(tasks)
    }
}

/// Users persisted at `user:{id}`, with a `username:{name}` index key
/// pointing at the id for login lookups.
#[derive(Clone)]
pub struct UserStore {
    client: Arc<Client>,
}

impl UserStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    async fn conn(&self) -> Result<redis::aio::Connection, ApiError> {
        self.client.get_async_connection().await.map_err(Into::into)
    }

    pub async fn insert(&self, user: &User) -> Result<(), ApiError> {
        let json = serde_json::to_string(user).map_err(|e| ApiError::Internal(e.to_string()))?;
        let mut conn = self.conn().await?;
        // SET NX reserves the username atomically; two concurrent
        // registrations of the same name cannot both win.
        let reserved: bool = conn
            .set_nx(username_key(&user.username), user.id.to_string())
            .await?;
        if !reserved {
            return Err(ApiError::Validation("Username already taken".into()));
        }
        let _: () = conn.set(user_key(user.id), json).await?;
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn.get(user_key(id)).await?;
        match raw {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| ApiError::Internal(e.to_string())),
            None => Ok(None),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let mut conn = self.conn().await?;
        let id: Option<String> = conn.get(username_key(username)).await?;
        let Some(id) = id else {
            return Ok(None);
        };
        let id = Uuid::parse_str(&id).map_err(|e| ApiError::Internal(e.to_string()))?;
        self.get(id).await
    }
}
