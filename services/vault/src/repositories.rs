//! Repositories for database operations
//!
//! Handlers and services depend on the [`UserStore`] and [`PasswordStore`]
//! traits; the PostgreSQL implementations live in the submodules.

use async_trait::async_trait;
use common::DatabaseResult;
use uuid::Uuid;

use crate::models::{NewPasswordRecord, NewUser, PasswordRecord, User};

pub mod password;
pub mod user;

#[cfg(test)]
pub mod memory;

pub use password::PasswordRepository;
pub use user::UserRepository;

/// Persistence for user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Fails with `DatabaseError::Duplicate` when the
    /// username or email is taken.
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User>;

    /// Find any user holding either the username or the email
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> DatabaseResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;
}

/// Persistence for password records. Every operation is scoped to the
/// owning user's id.
#[async_trait]
pub trait PasswordStore: Send + Sync {
    /// All records owned by `user_id`, oldest first
    async fn list_for_user(&self, user_id: Uuid) -> DatabaseResult<Vec<PasswordRecord>>;

    /// Persist a record owned by `user_id`
    async fn create(
        &self,
        user_id: Uuid,
        record: &NewPasswordRecord,
    ) -> DatabaseResult<PasswordRecord>;

    /// Delete the record only if it is owned by `user_id`. Returns whether
    /// a record was removed.
    async fn delete_for_user(&self, user_id: Uuid, id: Uuid) -> DatabaseResult<bool>;
}
