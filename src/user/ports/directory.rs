//! Directory port for user lookup and management.

use crate::user::domain::{User, UserFilters, UserId, UserPage};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user directory operations.
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// User persistence contract.
///
/// The schedule engine only looks users up; the remaining operations back
/// user management.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by identifier.
    ///
    /// Returns `None` when the user does not exist.
    async fn find_by_id(&self, id: UserId) -> UserDirectoryResult<Option<User>>;

    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::DuplicateUser`] when the identifier is
    /// already taken or [`UserDirectoryError::DuplicateEmail`] when another
    /// user owns the email address.
    async fn store(&self, user: &User) -> UserDirectoryResult<()>;

    /// Returns every user ordered by login name.
    async fn list_all(&self) -> UserDirectoryResult<Vec<User>>;

    /// Replaces a stored user with `user`.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::NotFound`] when no user has the
    /// identifier or [`UserDirectoryError::DuplicateEmail`] when another
    /// user owns the new email address.
    async fn update(&self, user: &User) -> UserDirectoryResult<()>;

    /// Removes a user.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::NotFound`] when no user has the
    /// identifier or [`UserDirectoryError::Referenced`] when schedules still
    /// name the user.
    async fn delete(&self, id: UserId) -> UserDirectoryResult<()>;

    /// Returns one page of users matching `filters`, ordered by login name.
    async fn search(&self, filters: &UserFilters) -> UserDirectoryResult<UserPage>;
}

/// Errors returned by user directory implementations.
#[derive(Debug, Clone, Error)]
pub enum UserDirectoryError {
    /// The user was not found.
    #[error("user not found: {0}")]
    NotFound(UserId),

    /// The user is still referenced by schedules.
    #[error("user {0} is referenced by schedules")]
    Referenced(UserId),

    /// A user with the same identifier already exists.
    #[error("duplicate user identifier: {0}")]
    DuplicateUser(UserId),

    /// A user with the same email address already exists.
    #[error("duplicate user email: {0}")]
    DuplicateEmail(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserDirectoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
