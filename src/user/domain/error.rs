//! Error types for user domain validation.

use thiserror::Error;

/// Errors returned while constructing user values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserDomainError {
    /// The user name is empty after trimming.
    #[error("user name must not be empty")]
    EmptyUserName,

    /// The email address is not of the `local@domain` form.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),
}
