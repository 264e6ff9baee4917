//! In-memory stores used to exercise services and routes without PostgreSQL

use async_trait::async_trait;
use chrono::Utc;
use common::{DatabaseError, DatabaseResult};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{PasswordStore, UserStore};
use crate::models::{NewPasswordRecord, NewUser, PasswordRecord, User};

#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<Mutex<Vec<User>>>,
}

impl MemoryUserStore {
    pub async fn count(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn all(&self) -> Vec<User> {
        self.users.lock().await.clone()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.username == new_user.username) {
            return Err(DatabaseError::Duplicate("users_username_key".to_string()));
        }
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::Duplicate("users_email_key".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> DatabaseResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users
            .iter()
            .find(|u| u.username == username || u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPasswordStore {
    records: Arc<Mutex<Vec<PasswordRecord>>>,
}

impl MemoryPasswordStore {
    pub async fn count(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl PasswordStore for MemoryPasswordStore {
    async fn list_for_user(&self, user_id: Uuid) -> DatabaseResult<Vec<PasswordRecord>> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        user_id: Uuid,
        record: &NewPasswordRecord,
    ) -> DatabaseResult<PasswordRecord> {
        let stored = PasswordRecord {
            id: Uuid::new_v4(),
            user_id,
            site: record.site.clone(),
            username: record.username.clone(),
            password: record.password.clone(),
            created_at: Utc::now(),
            extra: record.extra.clone(),
        };
        self.records.lock().await.push(stored.clone());
        Ok(stored)
    }

    async fn delete_for_user(&self, user_id: Uuid, id: Uuid) -> DatabaseResult<bool> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(records.len() < before)
    }
}
