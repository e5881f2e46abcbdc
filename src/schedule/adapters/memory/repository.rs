//! In-memory schedule repository for tests and local runs.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use mockable::Clock;

use crate::schedule::{
    domain::{
        DayWindow, Schedule, ScheduleFilters, ScheduleId, SchedulePage, SchedulePatch,
        ScheduleSortField, SortDirection, Task, TaskId, TaskPatch, VisitStatus,
    },
    ports::{ScheduleRepository, ScheduleRepositoryError, ScheduleRepositoryResult},
};
use crate::user::domain::UserId;

/// Thread-safe in-memory schedule repository.
///
/// Single occupancy and the expected status of conditional patches are
/// re-checked under the write lock, so two concurrent transitions of the
/// same visit, or two check-ins for the same assignee, cannot both succeed.
#[derive(Debug, Clone)]
pub struct InMemoryScheduleRepository<C: Clock + Send + Sync> {
    state: Arc<RwLock<InMemoryScheduleState>>,
    clock: C,
}

#[derive(Debug, Default)]
struct InMemoryScheduleState {
    schedules: HashMap<ScheduleId, Schedule>,
    task_index: HashMap<TaskId, ScheduleId>,
}

impl<C: Clock + Send + Sync> InMemoryScheduleRepository<C> {
    /// Creates an empty repository stamping updates with `clock`.
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryScheduleState::default())),
            clock,
        }
    }

    /// Returns the number of stored schedules.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::Persistence`] when the state lock
    /// is poisoned.
    pub fn len(&self) -> ScheduleRepositoryResult<usize> {
        Ok(self.read_state()?.schedules.len())
    }

    /// Returns `true` if no schedules are stored.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::Persistence`] when the state lock
    /// is poisoned.
    pub fn is_empty(&self) -> ScheduleRepositoryResult<bool> {
        Ok(self.len()? == 0)
    }

    fn read_state(
        &self,
    ) -> ScheduleRepositoryResult<std::sync::RwLockReadGuard<'_, InMemoryScheduleState>> {
        self.state.read().map_err(|err| {
            ScheduleRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_state(
        &self,
    ) -> ScheduleRepositoryResult<std::sync::RwLockWriteGuard<'_, InMemoryScheduleState>> {
        self.state.write().map_err(|err| {
            ScheduleRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn collect_sorted<P>(&self, predicate: P) -> ScheduleRepositoryResult<Vec<Schedule>>
    where
        P: Fn(&Schedule) -> bool,
    {
        let state = self.read_state()?;
        let mut schedules: Vec<Schedule> = state
            .schedules
            .values()
            .filter(|schedule| predicate(schedule))
            .cloned()
            .collect();
        schedules.sort_by(|left, right| default_order(left, right));
        Ok(schedules)
    }
}

fn default_order(left: &Schedule, right: &Schedule) -> Ordering {
    left.scheduled_slot()
        .starts_at()
        .cmp(&right.scheduled_slot().starts_at())
        .then_with(|| left.id().cmp(&right.id()))
}

fn compare_field(field: ScheduleSortField, left: &Schedule, right: &Schedule) -> Ordering {
    match field {
        ScheduleSortField::ScheduledSlotFrom => left
            .scheduled_slot()
            .starts_at()
            .cmp(&right.scheduled_slot().starts_at()),
        ScheduleSortField::ScheduledSlotTo => left
            .scheduled_slot()
            .ends_at()
            .cmp(&right.scheduled_slot().ends_at()),
        ScheduleSortField::ServiceName => left.service_name().cmp(right.service_name()),
        ScheduleSortField::VisitStatus => left
            .visit_status()
            .as_str()
            .cmp(right.visit_status().as_str()),
        ScheduleSortField::CreatedAt => left.created_at().cmp(&right.created_at()),
        ScheduleSortField::UpdatedAt => left.updated_at().cmp(&right.updated_at()),
    }
}

fn filtered_order(filters: &ScheduleFilters, left: &Schedule, right: &Schedule) -> Ordering {
    let primary = filters
        .sort_by()
        .iter()
        .fold(Ordering::Equal, |ordering, field| {
            ordering.then_with(|| compare_field(*field, left, right))
        });
    let directed = match filters.direction() {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };
    directed.then_with(|| default_order(left, right))
}

fn ensure_single_occupancy(
    state: &InMemoryScheduleState,
    id: ScheduleId,
    assignee: UserId,
) -> ScheduleRepositoryResult<()> {
    let busy = state.schedules.values().any(|other| {
        other.id() != id
            && other.assigned_user_id() == assignee
            && other.visit_status() == VisitStatus::InProgress
    });
    if busy {
        return Err(ScheduleRepositoryError::AssigneeBusy(assignee));
    }
    Ok(())
}

#[async_trait]
impl<C: Clock + Send + Sync> ScheduleRepository for InMemoryScheduleRepository<C> {
    async fn list_all(&self) -> ScheduleRepositoryResult<Vec<Schedule>> {
        self.collect_sorted(|_| true)
    }

    async fn find_by_id(&self, id: ScheduleId) -> ScheduleRepositoryResult<Option<Schedule>> {
        let state = self.read_state()?;
        Ok(state.schedules.get(&id).cloned())
    }

    async fn find_for_client_between(
        &self,
        client: UserId,
        window: DayWindow,
    ) -> ScheduleRepositoryResult<Vec<Schedule>> {
        self.collect_sorted(|schedule| {
            schedule.client_user_id() == client
                && window.contains(schedule.scheduled_slot().starts_at())
        })
    }

    async fn find_in_progress_by_assignee(
        &self,
        assignee: UserId,
    ) -> ScheduleRepositoryResult<Vec<Schedule>> {
        self.collect_sorted(|schedule| {
            schedule.assigned_user_id() == assignee
                && schedule.visit_status() == VisitStatus::InProgress
        })
    }

    async fn find_by_assignee_paginated(
        &self,
        assignee: UserId,
        filters: &ScheduleFilters,
    ) -> ScheduleRepositoryResult<SchedulePage> {
        let range = filters.slot_from_range();
        let mut matching = self.collect_sorted(|schedule| {
            schedule.assigned_user_id() == assignee
                && range.contains(schedule.scheduled_slot().starts_at())
        })?;
        matching.sort_by(|left, right| filtered_order(filters, left, right));

        let total = u64::try_from(matching.len()).map_err(ScheduleRepositoryError::persistence)?;
        let offset = usize::try_from(filters.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(filters.page_size()).unwrap_or(usize::MAX);
        let data = matching.into_iter().skip(offset).take(limit).collect();
        Ok(SchedulePage::new(data, total, filters))
    }

    async fn update(
        &self,
        id: ScheduleId,
        patch: &SchedulePatch,
    ) -> ScheduleRepositoryResult<Schedule> {
        let mut state = self.write_state()?;
        let current = state
            .schedules
            .get(&id)
            .ok_or(ScheduleRepositoryError::NotFound(id))?;
        if let Some(expected) = patch.expected_status()
            && current.visit_status() != expected
        {
            return Err(ScheduleRepositoryError::StatusConflict {
                id,
                expected,
                actual: current.visit_status(),
            });
        }

        let assignee = patch
            .assigned_user_id()
            .unwrap_or_else(|| current.assigned_user_id());
        let status = patch
            .visit_status()
            .unwrap_or_else(|| current.visit_status());
        if status == VisitStatus::InProgress {
            ensure_single_occupancy(&state, id, assignee)?;
        }

        let timestamp = self.clock.utc();
        let schedule = state
            .schedules
            .get_mut(&id)
            .ok_or(ScheduleRepositoryError::NotFound(id))?;
        schedule.apply(patch, timestamp);
        Ok(schedule.clone())
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> ScheduleRepositoryResult<Task> {
        let mut state = self.write_state()?;
        let schedule_id = *state
            .task_index
            .get(&id)
            .ok_or(ScheduleRepositoryError::TaskNotFound(id))?;
        let timestamp = self.clock.utc();
        let task = state
            .schedules
            .get_mut(&schedule_id)
            .and_then(|schedule| schedule.task_mut(id))
            .ok_or(ScheduleRepositoryError::TaskNotFound(id))?;
        task.apply(patch, timestamp);
        Ok(task.clone())
    }

    async fn create(&self, schedule: &Schedule) -> ScheduleRepositoryResult<Schedule> {
        let mut state = self.write_state()?;
        if state.schedules.contains_key(&schedule.id()) {
            return Err(ScheduleRepositoryError::DuplicateSchedule(schedule.id()));
        }
        if let Some(task) = schedule
            .tasks()
            .iter()
            .find(|task| state.task_index.contains_key(&task.id()))
        {
            return Err(ScheduleRepositoryError::DuplicateTask(task.id()));
        }
        if schedule.visit_status() == VisitStatus::InProgress {
            ensure_single_occupancy(&state, schedule.id(), schedule.assigned_user_id())?;
        }

        for task in schedule.tasks() {
            state.task_index.insert(task.id(), schedule.id());
        }
        state.schedules.insert(schedule.id(), schedule.clone());
        Ok(schedule.clone())
    }
}
