//! Request and outcome types for the visit lifecycle service.

use crate::schedule::domain::{
    Location, NewTask, Schedule, ScheduleId, ScheduledSlot, TaskId, TaskPatch,
};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Request payload for creating a schedule with its tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateScheduleRequest {
    pub(super) client_user_id: UserId,
    pub(super) assigned_user_id: UserId,
    pub(super) service_name: String,
    pub(super) scheduled_slot: ScheduledSlot,
    pub(super) tasks: Vec<NewTask>,
}

impl CreateScheduleRequest {
    /// Creates a request without tasks.
    #[must_use]
    pub fn new(
        client_user_id: UserId,
        assigned_user_id: UserId,
        service_name: impl Into<String>,
        scheduled_slot: ScheduledSlot,
    ) -> Self {
        Self {
            client_user_id,
            assigned_user_id,
            service_name: service_name.into(),
            scheduled_slot,
            tasks: Vec::new(),
        }
    }

    /// Appends one task definition.
    #[must_use]
    pub fn with_task(mut self, task: NewTask) -> Self {
        self.tasks.push(task);
        self
    }

    /// Appends several task definitions in order.
    #[must_use]
    pub fn with_tasks(mut self, tasks: impl IntoIterator<Item = NewTask>) -> Self {
        self.tasks.extend(tasks);
        self
    }
}

/// Partial update of a schedule; unset fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateScheduleRequest {
    pub(super) schedule_id: ScheduleId,
    pub(super) client_user_id: Option<UserId>,
    pub(super) assigned_user_id: Option<UserId>,
    pub(super) service_name: Option<String>,
    pub(super) slot_from: Option<DateTime<Utc>>,
    pub(super) slot_to: Option<DateTime<Utc>>,
    pub(super) visit_status: Option<String>,
    pub(super) service_note: Option<String>,
}

impl UpdateScheduleRequest {
    /// Creates an empty update for `schedule_id`.
    #[must_use]
    pub const fn new(schedule_id: ScheduleId) -> Self {
        Self {
            schedule_id,
            client_user_id: None,
            assigned_user_id: None,
            service_name: None,
            slot_from: None,
            slot_to: None,
            visit_status: None,
            service_note: None,
        }
    }

    /// Moves the visit to another client.
    #[must_use]
    pub const fn with_client_user_id(mut self, id: UserId) -> Self {
        self.client_user_id = Some(id);
        self
    }

    /// Reassigns the visit to another caregiver.
    #[must_use]
    pub const fn with_assigned_user_id(mut self, id: UserId) -> Self {
        self.assigned_user_id = Some(id);
        self
    }

    /// Renames the service.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Moves the slot start.
    #[must_use]
    pub const fn with_slot_from(mut self, from: DateTime<Utc>) -> Self {
        self.slot_from = Some(from);
        self
    }

    /// Moves the slot end.
    #[must_use]
    pub const fn with_slot_to(mut self, to: DateTime<Utc>) -> Self {
        self.slot_to = Some(to);
        self
    }

    /// Requests a visit status by its label, e.g. `"cancelled"`.
    #[must_use]
    pub fn with_visit_status(mut self, label: impl Into<String>) -> Self {
        self.visit_status = Some(label.into());
        self
    }

    /// Sets the service note.
    #[must_use]
    pub fn with_service_note(mut self, note: impl Into<String>) -> Self {
        self.service_note = Some(note.into());
        self
    }

    /// Returns the schedule being updated.
    #[must_use]
    pub const fn schedule_id(&self) -> ScheduleId {
        self.schedule_id
    }
}

/// Outcome recorded for one task when a visit ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub(super) task_id: TaskId,
    pub(super) update: TaskPatch,
}

impl TaskOutcome {
    /// Pairs a task with the fields to write.
    #[must_use]
    pub const fn new(task_id: TaskId, update: TaskPatch) -> Self {
        Self { task_id, update }
    }
}

/// Request payload for checking out of a visit.
#[derive(Debug, Clone, PartialEq)]
pub struct EndScheduleRequest {
    pub(super) timestamp: DateTime<Utc>,
    pub(super) location: Location,
    pub(super) task_outcomes: Vec<TaskOutcome>,
    pub(super) service_note: Option<String>,
}

impl EndScheduleRequest {
    /// Creates a check-out with no task outcomes and no note.
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, location: Location) -> Self {
        Self {
            timestamp,
            location,
            task_outcomes: Vec::new(),
            service_note: None,
        }
    }

    /// Appends a task outcome.
    #[must_use]
    pub fn with_task_outcome(mut self, outcome: TaskOutcome) -> Self {
        self.task_outcomes.push(outcome);
        self
    }

    /// Sets the caregiver's service note.
    #[must_use]
    pub fn with_service_note(mut self, note: impl Into<String>) -> Self {
        self.service_note = Some(note.into());
        self
    }
}

/// A task outcome that could not be written when a visit ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskUpdateFailure {
    /// Task the outcome was addressed to.
    pub task_id: TaskId,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Result of checking out of a visit.
///
/// The visit is completed even when some task outcomes fail; those are
/// listed in `failed_task_updates`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitCompletion {
    /// The completed schedule, read back after task updates.
    pub schedule: Schedule,
    /// Task outcomes that were not applied.
    pub failed_task_updates: Vec<TaskUpdateFailure>,
}

impl VisitCompletion {
    /// Returns whether every task outcome was applied.
    #[must_use]
    pub fn all_tasks_updated(&self) -> bool {
        self.failed_task_updates.is_empty()
    }
}
