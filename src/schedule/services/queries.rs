//! Read operations and client enrichment for the visit lifecycle service.

use super::{ScheduleLifecycleResult, ScheduleLifecycleService, UserRole};
use crate::schedule::{
    domain::{
        DateRange, DayWindow, Schedule, ScheduleFilters, ScheduleId, SchedulePage,
        ScheduleSortField, SortDirection,
    },
    ports::ScheduleRepository,
};
use crate::user::{
    domain::{User, UserId},
    ports::UserDirectory,
};
use mockable::Clock;
use serde::Serialize;
use std::collections::HashSet;

/// Schedules together with the distinct clients they reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulesWithClients {
    /// Schedules in listing order.
    pub schedules: Vec<Schedule>,
    /// Distinct clients in order of first appearance.
    pub clients: Vec<User>,
}

/// One schedule together with its client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleWithClient {
    /// The schedule.
    pub schedule: Schedule,
    /// The client, when the directory could resolve it.
    pub client: Option<User>,
}

impl<R, U, C> ScheduleLifecycleService<R, U, C>
where
    R: ScheduleRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Returns every schedule.
    ///
    /// # Errors
    ///
    /// Returns [`super::ScheduleLifecycleError::Repository`] when the lookup
    /// fails.
    pub async fn get_schedules(&self) -> ScheduleLifecycleResult<Vec<Schedule>> {
        Ok(self.schedules.list_all().await?)
    }

    /// Returns every schedule with its clients.
    ///
    /// # Errors
    ///
    /// Returns [`super::ScheduleLifecycleError::Repository`] when the lookup
    /// fails.
    pub async fn get_schedules_with_clients(&self) -> ScheduleLifecycleResult<SchedulesWithClients> {
        let schedules = self.get_schedules().await?;
        Ok(self.with_clients(schedules).await)
    }

    /// Returns one schedule.
    ///
    /// # Errors
    ///
    /// Returns [`super::ScheduleLifecycleError::ScheduleNotFound`] when the
    /// schedule does not exist.
    pub async fn get_schedule(&self, schedule_id: ScheduleId) -> ScheduleLifecycleResult<Schedule> {
        self.require_schedule(schedule_id).await
    }

    /// Returns one schedule with its client.
    ///
    /// # Errors
    ///
    /// Returns [`super::ScheduleLifecycleError::ScheduleNotFound`] when the
    /// schedule does not exist.
    pub async fn get_schedule_with_client(
        &self,
        schedule_id: ScheduleId,
    ) -> ScheduleLifecycleResult<ScheduleWithClient> {
        let schedule = self.require_schedule(schedule_id).await?;
        let client = self.lookup_client(schedule.client_user_id()).await;
        Ok(ScheduleWithClient { schedule, client })
    }

    /// Returns the client's schedules starting today on the local clock.
    ///
    /// # Errors
    ///
    /// Returns [`super::ScheduleLifecycleError::UserNotFound`] when the
    /// client does not exist.
    pub async fn get_today_schedules(
        &self,
        client: UserId,
    ) -> ScheduleLifecycleResult<Vec<Schedule>> {
        self.require_user(client, UserRole::Client).await?;
        let window = self.today()?;
        Ok(self
            .schedules
            .find_for_client_between(client, window)
            .await?)
    }

    /// Returns the client's schedules for today with client details.
    ///
    /// # Errors
    ///
    /// Returns [`super::ScheduleLifecycleError::UserNotFound`] when the
    /// client does not exist.
    pub async fn get_today_schedules_with_clients(
        &self,
        client: UserId,
    ) -> ScheduleLifecycleResult<SchedulesWithClients> {
        let schedules = self.get_today_schedules(client).await?;
        Ok(self.with_clients(schedules).await)
    }

    /// Returns the caregiver's schedules starting today on the local clock.
    ///
    /// Walks every page of the paginated assignee query.
    ///
    /// # Errors
    ///
    /// Returns [`super::ScheduleLifecycleError::UserNotFound`] when the
    /// caregiver does not exist.
    pub async fn get_today_schedules_by_assignee(
        &self,
        assignee: UserId,
    ) -> ScheduleLifecycleResult<Vec<Schedule>> {
        self.require_user(assignee, UserRole::Assigned).await?;
        let window = self.today()?;
        let mut filters = ScheduleFilters::new()
            .with_slot_from_range(DateRange {
                from: Some(window.start()),
                until: Some(window.end()),
            })
            .with_sort([ScheduleSortField::ScheduledSlotFrom], SortDirection::Asc)
            .with_page_size(ScheduleFilters::MAX_PAGE_SIZE);

        let mut schedules = Vec::new();
        loop {
            let page = self
                .schedules
                .find_by_assignee_paginated(assignee, &filters)
                .await?;
            let has_next = page.has_next() && !page.data.is_empty();
            let next_page = page.page.saturating_add(1);
            schedules.extend(page.data);
            if !has_next {
                break;
            }
            filters = filters.with_page(next_page);
        }
        Ok(schedules)
    }

    /// Returns the caregiver's schedules for today with client details.
    ///
    /// # Errors
    ///
    /// Returns [`super::ScheduleLifecycleError::UserNotFound`] when the
    /// caregiver does not exist.
    pub async fn get_today_schedules_by_assignee_with_clients(
        &self,
        assignee: UserId,
    ) -> ScheduleLifecycleResult<SchedulesWithClients> {
        let schedules = self.get_today_schedules_by_assignee(assignee).await?;
        Ok(self.with_clients(schedules).await)
    }

    /// Returns the caregiver's in-progress visits.
    ///
    /// # Errors
    ///
    /// Returns [`super::ScheduleLifecycleError::UserNotFound`] when the
    /// caregiver does not exist.
    pub async fn get_in_progress_by_assignee(
        &self,
        assignee: UserId,
    ) -> ScheduleLifecycleResult<Vec<Schedule>> {
        self.require_user(assignee, UserRole::Assigned).await?;
        Ok(self
            .schedules
            .find_in_progress_by_assignee(assignee)
            .await?)
    }

    /// Returns one page of the caregiver's schedules.
    ///
    /// # Errors
    ///
    /// Returns [`super::ScheduleLifecycleError::UserNotFound`] when the
    /// caregiver does not exist.
    pub async fn get_schedules_by_assignee(
        &self,
        assignee: UserId,
        filters: &ScheduleFilters,
    ) -> ScheduleLifecycleResult<SchedulePage> {
        self.require_user(assignee, UserRole::Assigned).await?;
        Ok(self
            .schedules
            .find_by_assignee_paginated(assignee, filters)
            .await?)
    }

    fn today(&self) -> ScheduleLifecycleResult<DayWindow> {
        Ok(DayWindow::containing(&self.clock.local())?)
    }

    async fn with_clients(&self, schedules: Vec<Schedule>) -> SchedulesWithClients {
        let mut seen = HashSet::new();
        let mut clients = Vec::new();
        for schedule in &schedules {
            let client_id = schedule.client_user_id();
            if !seen.insert(client_id) {
                continue;
            }
            if let Some(client) = self.lookup_client(client_id).await {
                clients.push(client);
            }
        }
        SchedulesWithClients { schedules, clients }
    }

    async fn lookup_client(&self, client_id: UserId) -> Option<User> {
        match self.users.find_by_id(client_id).await {
            Ok(Some(client)) => Some(client),
            Ok(None) => {
                tracing::warn!(client_user_id = %client_id, "client referenced by schedule not found");
                None
            }
            Err(error) => {
                tracing::warn!(%error, client_user_id = %client_id, "client lookup failed");
                None
            }
        }
    }
}
