//! Service-level errors for user management.

use crate::user::{
    domain::{UserDomainError, UserId},
    ports::UserDirectoryError,
};
use thiserror::Error;

/// Errors returned by user management operations.
#[derive(Debug, Error)]
pub enum UserManagementError {
    /// The submitted user data is invalid.
    #[error(transparent)]
    Domain(#[from] UserDomainError),
    /// The directory rejected or failed the operation.
    #[error(transparent)]
    Directory(#[from] UserDirectoryError),
    /// The user does not exist.
    #[error("user not found: {0}")]
    NotFound(UserId),
}

impl UserManagementError {
    /// Returns whether the error names a missing user.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Directory(UserDirectoryError::NotFound(_))
        )
    }

    /// Returns whether the request itself was at fault.
    #[must_use]
    pub const fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            Self::Domain(_)
                | Self::Directory(
                    UserDirectoryError::DuplicateEmail(_)
                        | UserDirectoryError::DuplicateUser(_)
                        | UserDirectoryError::Referenced(_)
                )
        )
    }
}

/// Result type for user management operations.
pub type UserManagementResult<T> = Result<T, UserManagementError>;
