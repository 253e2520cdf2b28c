//! User repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{NewUser, User, UserId};

/// Storage operations for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user.
    ///
    /// # Errors
    /// * `Conflict` - the email or username is already registered
    async fn create_user(&self, user: &NewUser) -> RepositoryResult<User>;

    /// Look up a user by email. Returns `Ok(None)` when absent.
    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    /// Retrieve a user by id.
    ///
    /// # Errors
    /// * `NotFound` - no user has this id
    async fn get_user(&self, id: UserId) -> RepositoryResult<User>;

    /// List all users ordered by id.
    async fn list_users(&self) -> RepositoryResult<Vec<User>>;

    /// Delete a user by id.
    ///
    /// # Errors
    /// * `NotFound` - no user has this id
    async fn delete_user(&self, id: UserId) -> RepositoryResult<()>;
}
