//! Service-level errors for the visit lifecycle.

use crate::schedule::{
    domain::{ParseVisitStatusError, ScheduleDomainError, ScheduleId},
    ports::ScheduleRepositoryError,
};
use crate::user::{domain::UserId, ports::UserDirectoryError};
use std::fmt;
use thiserror::Error;

/// Which side of a schedule a user was referenced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    /// The client receiving care.
    Client,
    /// The caregiver assigned to the visit.
    Assigned,
}

impl UserRole {
    /// Returns the lower-case label used in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Assigned => "assigned",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification used by presentation adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced schedule, task or user does not exist.
    NotFound,
    /// The request breaks a lifecycle or input rule.
    Validation,
    /// A collaborator failed.
    Repository,
}

/// Service-level errors for visit lifecycle operations.
#[derive(Debug, Error)]
pub enum ScheduleLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ScheduleDomainError),
    /// Schedule repository operation failed.
    #[error(transparent)]
    Repository(#[from] ScheduleRepositoryError),
    /// User directory operation failed.
    #[error(transparent)]
    UserDirectory(#[from] UserDirectoryError),
    /// The schedule does not exist.
    #[error("schedule not found: {0}")]
    ScheduleNotFound(ScheduleId),
    /// A user referenced by the request does not exist.
    #[error("{role} user not found: {id}")]
    UserNotFound {
        /// Side of the schedule the user was referenced from.
        role: UserRole,
        /// Missing user.
        id: UserId,
    },
    /// The visit status label is not recognised.
    #[error(transparent)]
    InvalidVisitStatus(#[from] ParseVisitStatusError),
}

impl ScheduleLifecycleError {
    /// Classifies the error for presentation.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) | Self::InvalidVisitStatus(_) => ErrorKind::Validation,
            Self::ScheduleNotFound(_)
            | Self::UserNotFound { .. }
            | Self::Repository(
                ScheduleRepositoryError::NotFound(_) | ScheduleRepositoryError::TaskNotFound(_),
            ) => ErrorKind::NotFound,
            Self::Repository(
                ScheduleRepositoryError::AssigneeBusy(_)
                | ScheduleRepositoryError::StatusConflict { .. }
                | ScheduleRepositoryError::DuplicateTask(_),
            ) => ErrorKind::Validation,
            Self::Repository(_) | Self::UserDirectory(_) => ErrorKind::Repository,
        }
    }
}

/// Result type for visit lifecycle service operations.
pub type ScheduleLifecycleResult<T> = Result<T, ScheduleLifecycleError>;
