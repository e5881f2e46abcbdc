//! Shared test helpers for in-memory integration tests.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use carevisit::{
    schedule::{
        adapters::memory::InMemoryScheduleRepository,
        domain::{
            DayWindow, Location, NewTask, Schedule, ScheduleFilters, ScheduleId, SchedulePage,
            SchedulePatch, ScheduledSlot, Task, TaskId, TaskPatch,
        },
        ports::{ScheduleRepository, ScheduleRepositoryResult},
        services::{CreateScheduleRequest, ScheduleLifecycleService},
    },
    user::{
        adapters::memory::InMemoryUserDirectory,
        domain::{User, UserId},
        ports::UserDirectory,
    },
};
use chrono::{DateTime, Duration, Utc};
use mockable::DefaultClock;
use rstest::fixture;
use tokio::{runtime::Runtime, sync::Barrier};

/// Provides a tokio runtime for async operations in tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
#[fixture]
pub fn runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Schedule store whose lookups by id can be made to wait for each other.
///
/// Once armed, the next `readers` lookups each read their snapshot and then
/// wait until all of them have read. Concurrent commands therefore validate
/// against the same state before any of them writes.
pub struct LockstepReads<R> {
    inner: R,
    readers: usize,
    gate: Barrier,
    remaining: AtomicUsize,
}

impl<R> LockstepReads<R> {
    /// Wraps `inner`; lookups pass straight through until [`Self::arm`].
    #[must_use]
    pub fn new(inner: R, readers: usize) -> Self {
        Self {
            inner,
            readers,
            gate: Barrier::new(readers),
            remaining: AtomicUsize::new(0),
        }
    }

    /// Holds back the next `readers` lookups by id.
    pub fn arm(&self) {
        self.remaining.store(self.readers, Ordering::SeqCst);
    }
}

#[async_trait]
impl<R: ScheduleRepository> ScheduleRepository for LockstepReads<R> {
    async fn list_all(&self) -> ScheduleRepositoryResult<Vec<Schedule>> {
        self.inner.list_all().await
    }

    async fn find_by_id(&self, id: ScheduleId) -> ScheduleRepositoryResult<Option<Schedule>> {
        let found = self.inner.find_by_id(id).await;
        let gated = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if gated {
            self.gate.wait().await;
        }
        found
    }

    async fn find_for_client_between(
        &self,
        client: UserId,
        window: DayWindow,
    ) -> ScheduleRepositoryResult<Vec<Schedule>> {
        self.inner.find_for_client_between(client, window).await
    }

    async fn find_in_progress_by_assignee(
        &self,
        assignee: UserId,
    ) -> ScheduleRepositoryResult<Vec<Schedule>> {
        self.inner.find_in_progress_by_assignee(assignee).await
    }

    async fn find_by_assignee_paginated(
        &self,
        assignee: UserId,
        filters: &ScheduleFilters,
    ) -> ScheduleRepositoryResult<SchedulePage> {
        self.inner.find_by_assignee_paginated(assignee, filters).await
    }

    async fn update(
        &self,
        id: ScheduleId,
        patch: &SchedulePatch,
    ) -> ScheduleRepositoryResult<Schedule> {
        self.inner.update(id, patch).await
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> ScheduleRepositoryResult<Task> {
        self.inner.update_task(id, patch).await
    }

    async fn create(&self, schedule: &Schedule) -> ScheduleRepositoryResult<Schedule> {
        self.inner.create(schedule).await
    }
}

/// In-memory store whose lookups can be held in lockstep.
pub type LockstepStore = LockstepReads<InMemoryScheduleRepository<DefaultClock>>;

/// A service with one client and one caregiver stored.
pub struct Agency<R = InMemoryScheduleRepository<DefaultClock>>
where
    R: ScheduleRepository,
{
    pub service: Arc<ScheduleLifecycleService<R, InMemoryUserDirectory, DefaultClock>>,
    pub schedules: Arc<R>,
    pub users: Arc<InMemoryUserDirectory>,
    pub client: UserId,
    pub caregiver: UserId,
}

impl Agency {
    /// Builds the service and stores its two users.
    ///
    /// # Errors
    ///
    /// Returns an error if a user cannot be created or stored.
    pub async fn new() -> eyre::Result<Self> {
        Self::with_store(InMemoryScheduleRepository::new(DefaultClock)).await
    }
}

impl Agency<LockstepStore> {
    /// Builds a service whose store can hold `readers` lookups in lockstep.
    ///
    /// # Errors
    ///
    /// Returns an error if a user cannot be created or stored.
    pub async fn lockstep(readers: usize) -> eyre::Result<Self> {
        let store = LockstepReads::new(InMemoryScheduleRepository::new(DefaultClock), readers);
        Self::with_store(store).await
    }
}

impl<R: ScheduleRepository> Agency<R> {
    async fn with_store(store: R) -> eyre::Result<Self> {
        let users = Arc::new(InMemoryUserDirectory::new());
        let client = User::new("client", "client@example.com", "client", &DefaultClock)?;
        let caregiver = User::new("carer", "carer@example.com", "caregiver", &DefaultClock)?;
        users.store(&client).await?;
        users.store(&caregiver).await?;

        let schedules = Arc::new(store);
        let service = ScheduleLifecycleService::new(
            Arc::clone(&schedules),
            Arc::clone(&users),
            Arc::new(DefaultClock),
        );
        Ok(Self {
            service: Arc::new(service),
            schedules,
            users,
            client: client.id(),
            caregiver: caregiver.id(),
        })
    }

    /// Returns a two-task request for an hour-long visit at `start`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot is rejected.
    pub fn request_at(&self, start: DateTime<Utc>) -> eyre::Result<CreateScheduleRequest> {
        let slot = ScheduledSlot::new(start, start + Duration::hours(1))?;
        Ok(
            CreateScheduleRequest::new(self.client, self.caregiver, "Home care", slot)
                .with_task(NewTask::new("Give medication"))
                .with_task(NewTask::new("Check vitals")),
        )
    }

    /// Creates a visit at `start`.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails.
    pub async fn create_at(&self, start: DateTime<Utc>) -> eyre::Result<Schedule> {
        Ok(self.service.create_schedule(self.request_at(start)?).await?)
    }
}

/// Position reported by the caregiver's device.
#[must_use]
pub const fn home() -> Location {
    Location::new(51.5074, -0.1278)
}
