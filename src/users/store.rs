// src/users/store.rs
// User lookup for ownership checks, notifications and authentication

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::RwLock;

use super::types::{NewUser, User};
use crate::error::RepoError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, id: i64) -> Result<User, RepoError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<User>, RepoError>;

    async fn create(&self, user: NewUser) -> Result<User, RepoError>;
}

#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserStore {
    async fn get(&self, id: i64) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>("SELECT id, name, email, api_token FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepoError::user_not_found(id))
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, api_token FROM users WHERE api_token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let id = sqlx::query(
            "INSERT INTO users (name, email, api_token, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.api_token)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get(id).await
    }
}

/// In-memory user store for tests and local experiments.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserStore {
    async fn get(&self, id: i64) -> Result<User, RepoError> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(RepoError::user_not_found(id))
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.api_token == token)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = User {
            id,
            name: user.name,
            email: user.email,
            api_token: user.api_token,
        };
        users.push(user.clone());
        Ok(user)
    }
}
