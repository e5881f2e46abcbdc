//! Schedule aggregate root and visit lifecycle rules.

use super::{
    NewTask, ScheduleDomainError, ScheduleId, SchedulePatch, ScheduledSlot, Task, TaskId,
    VisitStamp, VisitStatus,
};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One caregiver visit with its tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    id: ScheduleId,
    client_user_id: UserId,
    assigned_user_id: UserId,
    service_name: String,
    scheduled_slot: ScheduledSlot,
    visit_status: VisitStatus,
    check_in: Option<VisitStamp>,
    check_out: Option<VisitStamp>,
    tasks: Vec<Task>,
    service_note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for a schedule about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScheduleData {
    /// Client receiving care.
    pub client_user_id: UserId,
    /// Caregiver performing the visit.
    pub assigned_user_id: UserId,
    /// Service label.
    pub service_name: String,
    /// Planned time window.
    pub scheduled_slot: ScheduledSlot,
    /// Checklist for the visit, in order.
    pub tasks: Vec<NewTask>,
}

/// Parameter object for reconstructing a persisted schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedScheduleData {
    /// Persisted identifier.
    pub id: ScheduleId,
    /// Persisted client.
    pub client_user_id: UserId,
    /// Persisted assignee.
    pub assigned_user_id: UserId,
    /// Persisted service label.
    pub service_name: String,
    /// Persisted slot.
    pub scheduled_slot: ScheduledSlot,
    /// Persisted lifecycle status.
    pub visit_status: VisitStatus,
    /// Persisted check-in, if any.
    pub check_in: Option<VisitStamp>,
    /// Persisted check-out, if any.
    pub check_out: Option<VisitStamp>,
    /// Persisted tasks in order.
    pub tasks: Vec<Task>,
    /// Persisted service note.
    pub service_note: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    /// Creates an upcoming schedule whose tasks are all pending.
    ///
    /// Tasks without an identifier receive a generated one.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::NoTasks`] when no task is supplied,
    /// [`ScheduleDomainError::EmptyTaskTitle`] when a title is blank, or
    /// [`ScheduleDomainError::DuplicateTask`] when two tasks share an
    /// identifier.
    pub fn new(data: NewScheduleData, clock: &impl Clock) -> Result<Self, ScheduleDomainError> {
        if data.tasks.is_empty() {
            return Err(ScheduleDomainError::NoTasks);
        }

        let timestamp = clock.utc();
        let id = ScheduleId::new();
        let tasks = data
            .tasks
            .into_iter()
            .map(|definition| Task::from_new(definition, id, timestamp))
            .collect::<Result<Vec<_>, _>>()?;
        let mut seen = HashSet::with_capacity(tasks.len());
        if let Some(repeated) = tasks.iter().find(|task| !seen.insert(task.id())) {
            return Err(ScheduleDomainError::DuplicateTask(repeated.id()));
        }

        Ok(Self {
            id,
            client_user_id: data.client_user_id,
            assigned_user_id: data.assigned_user_id,
            service_name: data.service_name,
            scheduled_slot: data.scheduled_slot,
            visit_status: VisitStatus::Upcoming,
            check_in: None,
            check_out: None,
            tasks,
            service_note: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a schedule from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedScheduleData) -> Self {
        Self {
            id: data.id,
            client_user_id: data.client_user_id,
            assigned_user_id: data.assigned_user_id,
            service_name: data.service_name,
            scheduled_slot: data.scheduled_slot,
            visit_status: data.visit_status,
            check_in: data.check_in,
            check_out: data.check_out,
            tasks: data.tasks,
            service_note: data.service_note,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the schedule identifier.
    #[must_use]
    pub const fn id(&self) -> ScheduleId {
        self.id
    }

    /// Returns the client receiving care.
    #[must_use]
    pub const fn client_user_id(&self) -> UserId {
        self.client_user_id
    }

    /// Returns the caregiver assigned to the visit.
    #[must_use]
    pub const fn assigned_user_id(&self) -> UserId {
        self.assigned_user_id
    }

    /// Returns the service label.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the planned slot.
    #[must_use]
    pub const fn scheduled_slot(&self) -> ScheduledSlot {
        self.scheduled_slot
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn visit_status(&self) -> VisitStatus {
        self.visit_status
    }

    /// Returns the check-in stamp, if checked in.
    #[must_use]
    pub const fn check_in(&self) -> Option<&VisitStamp> {
        self.check_in.as_ref()
    }

    /// Returns the check-out stamp, if checked out.
    #[must_use]
    pub const fn check_out(&self) -> Option<&VisitStamp> {
        self.check_out.as_ref()
    }

    /// Returns the tasks in order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the task with `task_id`, if it belongs to this schedule.
    #[must_use]
    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == task_id)
    }

    /// Returns the service note, if any.
    #[must_use]
    pub fn service_note(&self) -> Option<&str> {
        self.service_note.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Validates a check-in and returns the patch that records it.
    ///
    /// Only the lower slot bound is enforced; late check-ins are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::NotUpcoming`] unless the visit is
    /// upcoming, or [`ScheduleDomainError::StartBeforeSlot`] when `stamp`
    /// precedes the slot start.
    pub fn check_in_patch(&self, stamp: VisitStamp) -> Result<SchedulePatch, ScheduleDomainError> {
        self.ensure_transition(VisitStatus::InProgress)?;
        let slot_start = self.scheduled_slot.starts_at();
        if stamp.time < slot_start {
            return Err(ScheduleDomainError::StartBeforeSlot {
                schedule_id: self.id,
                requested: stamp.time,
                slot_start,
            });
        }

        Ok(SchedulePatch::default()
            .expecting(VisitStatus::Upcoming)
            .status(VisitStatus::InProgress)
            .checked_in(stamp))
    }

    /// Validates a check-out and returns the patch that records it.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::NotInProgress`] unless the visit is in
    /// progress, or [`ScheduleDomainError::CheckoutBeforeCheckIn`] when
    /// `stamp` precedes the recorded check-in.
    pub fn check_out_patch(
        &self,
        stamp: VisitStamp,
        service_note: Option<String>,
    ) -> Result<SchedulePatch, ScheduleDomainError> {
        self.ensure_transition(VisitStatus::Completed)?;
        if let Some(check_in) = self.check_in
            && stamp.time < check_in.time
        {
            return Err(ScheduleDomainError::CheckoutBeforeCheckIn {
                checkin: check_in.time,
                checkout: stamp.time,
            });
        }

        let patch = SchedulePatch::default()
            .expecting(VisitStatus::InProgress)
            .status(VisitStatus::Completed)
            .checked_out(stamp);
        Ok(match service_note {
            Some(note) => patch.note(note),
            None => patch,
        })
    }

    /// Validates a status requested through a plain update.
    ///
    /// Returns `None` when the status is unchanged. Check-in and check-out
    /// are not reachable this way because they need a stamp; the only edge
    /// left is cancelling an upcoming visit.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::TerminalStatus`] when leaving a
    /// terminal status, or [`ScheduleDomainError::InvalidStatusTransition`]
    /// for any other change.
    pub fn status_change(
        &self,
        target: VisitStatus,
    ) -> Result<Option<VisitStatus>, ScheduleDomainError> {
        let current = self.visit_status;
        if current == target {
            return Ok(None);
        }
        if current.is_terminal() {
            return Err(ScheduleDomainError::TerminalStatus {
                from: current,
                to: target,
            });
        }
        if target == VisitStatus::Cancelled && current.can_transition_to(target) {
            return Ok(Some(target));
        }
        Err(ScheduleDomainError::InvalidStatusTransition {
            from: current,
            to: target,
        })
    }

    /// Applies a validated patch, touching `updated_at`.
    pub fn apply(&mut self, patch: &SchedulePatch, timestamp: DateTime<Utc>) {
        if let Some(id) = patch.client_user_id() {
            self.client_user_id = id;
        }
        if let Some(id) = patch.assigned_user_id() {
            self.assigned_user_id = id;
        }
        if let Some(name) = patch.service_name_value() {
            name.clone_into(&mut self.service_name);
        }
        if let Some(slot) = patch.scheduled_slot() {
            self.scheduled_slot = slot;
        }
        if let Some(status) = patch.visit_status() {
            self.visit_status = status;
        }
        if let Some(stamp) = patch.check_in() {
            self.check_in = Some(stamp);
        }
        if let Some(stamp) = patch.check_out() {
            self.check_out = Some(stamp);
        }
        if let Some(note) = patch.service_note() {
            self.service_note = Some(note.to_owned());
        }
        self.updated_at = timestamp;
    }

    /// Returns a mutable task reference for store adapters.
    pub(crate) fn task_mut(&mut self, task_id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id() == task_id)
    }

    fn ensure_transition(&self, target: VisitStatus) -> Result<(), ScheduleDomainError> {
        if self.visit_status.can_transition_to(target) {
            return Ok(());
        }
        Err(match target {
            VisitStatus::Completed => ScheduleDomainError::NotInProgress {
                schedule_id: self.id,
                status: self.visit_status,
            },
            _ => ScheduleDomainError::NotUpcoming {
                schedule_id: self.id,
                status: self.visit_status,
            },
        })
    }
}
