//! Error types for schedule domain validation and parsing.

use super::{ScheduleId, TaskId, VisitStatus};
use crate::user::domain::UserId;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Validation failures raised by the visit lifecycle rules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleDomainError {
    /// The scheduled slot starts after it ends.
    #[error("scheduled slot start {from} must not be after its end {to}")]
    InvalidSlot {
        /// Requested slot start.
        from: DateTime<Utc>,
        /// Requested slot end.
        to: DateTime<Utc>,
    },

    /// A schedule was submitted without any task.
    #[error("a schedule requires at least one task")]
    NoTasks,

    /// Two tasks of one schedule share an identifier.
    #[error("task identifier {0} appears more than once")]
    DuplicateTask(TaskId),

    /// A task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// Check-in attempted on a visit that is not upcoming.
    #[error("schedule {schedule_id} is not in upcoming status (current status: {status})")]
    NotUpcoming {
        /// Visit being started.
        schedule_id: ScheduleId,
        /// Status found on the visit.
        status: VisitStatus,
    },

    /// Check-in attempted before the planned slot opens.
    #[error("cannot start schedule {schedule_id} before the scheduled start time {slot_start}")]
    StartBeforeSlot {
        /// Visit being started.
        schedule_id: ScheduleId,
        /// Requested check-in time.
        requested: DateTime<Utc>,
        /// Planned slot start.
        slot_start: DateTime<Utc>,
    },

    /// The caregiver already has a visit in progress.
    #[error("another schedule is already in progress for user {assignee}")]
    AssigneeBusy {
        /// Caregiver with the in-progress visit.
        assignee: UserId,
    },

    /// Check-out attempted on a visit that is not in progress.
    #[error("schedule {schedule_id} is not in in_progress status (current status: {status})")]
    NotInProgress {
        /// Visit being ended.
        schedule_id: ScheduleId,
        /// Status found on the visit.
        status: VisitStatus,
    },

    /// Check-out time precedes the recorded check-in time.
    #[error("check-out time {checkout} is before check-in time {checkin}")]
    CheckoutBeforeCheckIn {
        /// Recorded check-in time.
        checkin: DateTime<Utc>,
        /// Requested check-out time.
        checkout: DateTime<Utc>,
    },

    /// A completed or cancelled visit was asked to change status.
    #[error("cannot change status from {from} to {to}")]
    TerminalStatus {
        /// Terminal status held by the visit.
        from: VisitStatus,
        /// Requested status.
        to: VisitStatus,
    },

    /// The requested status change is not an edge reachable by update.
    #[error("invalid visit status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: VisitStatus,
        /// Requested status.
        to: VisitStatus,
    },

    /// Local midnight does not exist or cannot be resolved for the date.
    #[error("cannot resolve the local day boundaries of {0}")]
    UnresolvableDay(NaiveDate),
}

/// Error returned while parsing visit statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid visit status: {0}")]
pub struct ParseVisitStatusError(pub String);

/// Error returned while parsing sort fields or directions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid sort option: {0}")]
pub struct ParseSortError(pub String);
