//! Repository port for schedule persistence and lookup.

use crate::schedule::domain::{
    DayWindow, Schedule, ScheduleFilters, ScheduleId, SchedulePage, SchedulePatch, Task, TaskId,
    TaskPatch, VisitStatus,
};
use crate::user::domain::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for schedule repository operations.
pub type ScheduleRepositoryResult<T> = Result<T, ScheduleRepositoryError>;

/// Schedule persistence contract.
///
/// Implementations apply patches verbatim; lifecycle rules are checked
/// before a patch reaches the store. Stores enforce what only they can check
/// atomically: single occupancy, the expected status carried by a
/// conditional patch, and task identifier uniqueness.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Returns every schedule ordered by slot start.
    async fn list_all(&self) -> ScheduleRepositoryResult<Vec<Schedule>>;

    /// Finds a schedule by identifier.
    ///
    /// Returns `None` when the schedule does not exist.
    async fn find_by_id(&self, id: ScheduleId) -> ScheduleRepositoryResult<Option<Schedule>>;

    /// Returns the client's schedules whose slot starts inside `window`.
    async fn find_for_client_between(
        &self,
        client: UserId,
        window: DayWindow,
    ) -> ScheduleRepositoryResult<Vec<Schedule>>;

    /// Returns the assignee's schedules that are in progress.
    async fn find_in_progress_by_assignee(
        &self,
        assignee: UserId,
    ) -> ScheduleRepositoryResult<Vec<Schedule>>;

    /// Returns one page of the assignee's schedules.
    async fn find_by_assignee_paginated(
        &self,
        assignee: UserId,
        filters: &ScheduleFilters,
    ) -> ScheduleRepositoryResult<SchedulePage>;

    /// Applies a patch to a schedule and returns the stored result.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::NotFound`] when the schedule does
    /// not exist, [`ScheduleRepositoryError::StatusConflict`] when the stored
    /// status differs from [`SchedulePatch::expected_status`], or
    /// [`ScheduleRepositoryError::AssigneeBusy`] when the patch would give
    /// the assignee a second in-progress visit. Nothing is written on error.
    async fn update(
        &self,
        id: ScheduleId,
        patch: &SchedulePatch,
    ) -> ScheduleRepositoryResult<Schedule>;

    /// Applies a patch to a task and returns the stored result.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::TaskNotFound`] when the task does
    /// not exist.
    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> ScheduleRepositoryResult<Task>;

    /// Stores a new schedule together with its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::DuplicateSchedule`] when the
    /// schedule identifier already exists, or
    /// [`ScheduleRepositoryError::DuplicateTask`] when a task identifier is
    /// already used by any stored schedule.
    async fn create(&self, schedule: &Schedule) -> ScheduleRepositoryResult<Schedule>;
}

/// Errors returned by schedule repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ScheduleRepositoryError {
    /// The schedule was not found.
    #[error("schedule not found: {0}")]
    NotFound(ScheduleId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A schedule with the same identifier already exists.
    #[error("duplicate schedule identifier: {0}")]
    DuplicateSchedule(ScheduleId),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The stored status moved on since the patch was validated.
    #[error("schedule {id} is {actual}, expected {expected}")]
    StatusConflict {
        /// Schedule being written.
        id: ScheduleId,
        /// Status the patch was validated against.
        expected: VisitStatus,
        /// Status found in the store.
        actual: VisitStatus,
    },

    /// The assignee already has a visit in progress.
    #[error("another schedule is already in progress for user {0}")]
    AssigneeBusy(UserId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ScheduleRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
