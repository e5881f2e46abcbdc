//! Visit lifecycle commands: create, start, end and update.

use super::{
    CreateScheduleRequest, EndScheduleRequest, ScheduleLifecycleError, ScheduleLifecycleResult,
    TaskUpdateFailure, UpdateScheduleRequest, UserRole, VisitCompletion,
};
use crate::schedule::{
    domain::{
        Location, NewScheduleData, Schedule, ScheduleDomainError, ScheduleId, SchedulePatch,
        Task, TaskId, TaskPatch, VisitStamp, VisitStatus,
    },
    ports::{ScheduleRepository, ScheduleRepositoryError},
};
use crate::user::{
    domain::{User, UserId},
    ports::UserDirectory,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;

/// Visit lifecycle orchestration service.
///
/// Every mutation is validated against the visit state machine and the
/// user directory before a patch reaches the repository.
#[derive(Clone)]
pub struct ScheduleLifecycleService<R, U, C>
where
    R: ScheduleRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    pub(super) schedules: Arc<R>,
    pub(super) users: Arc<U>,
    pub(super) clock: Arc<C>,
}

impl<R, U, C> ScheduleLifecycleService<R, U, C>
where
    R: ScheduleRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new visit lifecycle service.
    #[must_use]
    pub const fn new(schedules: Arc<R>, users: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            schedules,
            users,
            clock,
        }
    }

    /// Creates an upcoming schedule with pending tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleLifecycleError::UserNotFound`] when either user is
    /// missing, [`ScheduleLifecycleError::Domain`] when the task list is
    /// empty or a title is blank, or [`ScheduleLifecycleError::Repository`]
    /// when persistence fails. Nothing is written on error.
    pub async fn create_schedule(
        &self,
        request: CreateScheduleRequest,
    ) -> ScheduleLifecycleResult<Schedule> {
        self.require_user(request.client_user_id, UserRole::Client)
            .await?;
        self.require_user(request.assigned_user_id, UserRole::Assigned)
            .await?;

        let schedule = Schedule::new(
            NewScheduleData {
                client_user_id: request.client_user_id,
                assigned_user_id: request.assigned_user_id,
                service_name: request.service_name,
                scheduled_slot: request.scheduled_slot,
                tasks: request.tasks,
            },
            &*self.clock,
        )?;
        let stored = self.schedules.create(&schedule).await?;

        tracing::info!(
            schedule_id = %stored.id(),
            client_user_id = %stored.client_user_id(),
            assigned_user_id = %stored.assigned_user_id(),
            tasks = stored.tasks().len(),
            "schedule created"
        );
        Ok(stored)
    }

    /// Checks the caregiver into an upcoming visit.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleLifecycleError::ScheduleNotFound`] when the
    /// schedule is missing, or [`ScheduleLifecycleError::Domain`] when the
    /// visit is not upcoming, `timestamp` precedes the slot start or the
    /// caregiver already has a visit in progress.
    pub async fn start_schedule(
        &self,
        schedule_id: ScheduleId,
        timestamp: DateTime<Utc>,
        location: Location,
    ) -> ScheduleLifecycleResult<Schedule> {
        let schedule = self.require_schedule(schedule_id).await?;
        let patch = schedule.check_in_patch(VisitStamp::new(timestamp, location))?;

        let assignee = schedule.assigned_user_id();
        let in_progress = self.schedules.find_in_progress_by_assignee(assignee).await?;
        if in_progress.iter().any(|other| other.id() != schedule_id) {
            tracing::warn!(
                %schedule_id,
                assigned_user_id = %assignee,
                "check-in rejected; caregiver already has a visit in progress"
            );
            return Err(ScheduleDomainError::AssigneeBusy { assignee }.into());
        }

        let updated = self.apply_patch(schedule_id, &patch).await?;
        tracing::info!(%schedule_id, assigned_user_id = %assignee, "visit started");
        Ok(updated)
    }

    /// Checks the caregiver out of an in-progress visit and records task
    /// outcomes.
    ///
    /// Task outcomes are applied one by one after the visit is completed.
    /// Outcomes addressed to tasks outside this schedule, or rejected by the
    /// repository, are reported in [`VisitCompletion::failed_task_updates`]
    /// rather than failing the call.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleLifecycleError::ScheduleNotFound`] when the
    /// schedule is missing, or [`ScheduleLifecycleError::Domain`] when the
    /// visit is not in progress or the check-out precedes the check-in.
    pub async fn end_schedule(
        &self,
        schedule_id: ScheduleId,
        request: EndScheduleRequest,
    ) -> ScheduleLifecycleResult<VisitCompletion> {
        let schedule = self.require_schedule(schedule_id).await?;
        let patch = schedule.check_out_patch(
            VisitStamp::new(request.timestamp, request.location),
            request.service_note,
        )?;
        self.apply_patch(schedule_id, &patch).await?;

        let mut failed_task_updates = Vec::new();
        for outcome in request.task_outcomes {
            if let Err(reason) = self
                .apply_task_outcome(&schedule, outcome.task_id, &outcome.update)
                .await
            {
                tracing::warn!(
                    %schedule_id,
                    task_id = %outcome.task_id,
                    %reason,
                    "task outcome not applied at check-out"
                );
                failed_task_updates.push(TaskUpdateFailure {
                    task_id: outcome.task_id,
                    reason,
                });
            }
        }

        let completed = self.require_schedule(schedule_id).await?;
        tracing::info!(
            %schedule_id,
            failed_task_updates = failed_task_updates.len(),
            "visit completed"
        );
        Ok(VisitCompletion {
            schedule: completed,
            failed_task_updates,
        })
    }

    /// Writes status, completion flag or feedback on a task.
    ///
    /// Applying the same update twice yields the same task state.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleLifecycleError::Repository`] when the task does not
    /// exist or persistence fails.
    pub async fn update_task_status(
        &self,
        task_id: TaskId,
        update: TaskPatch,
    ) -> ScheduleLifecycleResult<Task> {
        let task = self.schedules.update_task(task_id, &update).await?;
        tracing::info!(%task_id, status = task.status(), "task updated");
        Ok(task)
    }

    /// Applies a partial update to a schedule.
    ///
    /// The only status change reachable here is cancelling an upcoming
    /// visit; requesting the current status is accepted and changes
    /// nothing. An update with no fields returns the stored schedule.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleLifecycleError::ScheduleNotFound`] or
    /// [`ScheduleLifecycleError::UserNotFound`] for missing references,
    /// [`ScheduleLifecycleError::InvalidVisitStatus`] for an unknown status
    /// label, and [`ScheduleLifecycleError::Domain`] when the merged slot is
    /// inverted or the status change is not allowed.
    pub async fn update_schedule(
        &self,
        request: UpdateScheduleRequest,
    ) -> ScheduleLifecycleResult<Schedule> {
        let schedule_id = request.schedule_id;
        let schedule = self.require_schedule(schedule_id).await?;
        let mut patch = SchedulePatch::default();

        if let Some(label) = request.visit_status.as_deref() {
            let target = VisitStatus::try_from(label)?;
            if let Some(status) = schedule.status_change(target)? {
                patch = patch.expecting(schedule.visit_status()).status(status);
            }
        }
        if request.slot_from.is_some() || request.slot_to.is_some() {
            let slot = schedule
                .scheduled_slot()
                .with_bounds(request.slot_from, request.slot_to)?;
            patch = patch.slot(slot);
        }
        if let Some(client) = request.client_user_id {
            self.require_user(client, UserRole::Client).await?;
            patch = patch.client_user(client);
        }
        if let Some(assignee) = request.assigned_user_id {
            self.require_user(assignee, UserRole::Assigned).await?;
            patch = patch.assigned_user(assignee);
        }
        if let Some(name) = request.service_name {
            patch = patch.service_name(name);
        }
        if let Some(note) = request.service_note {
            patch = patch.note(note);
        }

        if patch.is_empty() {
            return Ok(schedule);
        }
        let updated = self.apply_patch(schedule_id, &patch).await?;
        tracing::info!(%schedule_id, status = %updated.visit_status(), "schedule updated");
        Ok(updated)
    }

    pub(super) async fn require_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> ScheduleLifecycleResult<Schedule> {
        self.schedules
            .find_by_id(schedule_id)
            .await?
            .ok_or(ScheduleLifecycleError::ScheduleNotFound(schedule_id))
    }

    pub(super) async fn require_user(
        &self,
        id: UserId,
        role: UserRole,
    ) -> ScheduleLifecycleResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(ScheduleLifecycleError::UserNotFound { role, id })
    }

    async fn apply_patch(
        &self,
        schedule_id: ScheduleId,
        patch: &SchedulePatch,
    ) -> ScheduleLifecycleResult<Schedule> {
        self.schedules
            .update(schedule_id, patch)
            .await
            .map_err(|err| match err {
                ScheduleRepositoryError::AssigneeBusy(assignee) => {
                    ScheduleDomainError::AssigneeBusy { assignee }.into()
                }
                ScheduleRepositoryError::NotFound(id) => {
                    ScheduleLifecycleError::ScheduleNotFound(id)
                }
                other => other.into(),
            })
    }

    async fn apply_task_outcome(
        &self,
        schedule: &Schedule,
        task_id: TaskId,
        update: &TaskPatch,
    ) -> Result<(), String> {
        if schedule.task(task_id).is_none() {
            return Err(format!(
                "task {task_id} does not belong to schedule {}",
                schedule.id()
            ));
        }
        self.schedules
            .update_task(task_id, update)
            .await
            .map(|_| ())
            .map_err(|err| err.to_string())
    }
}
