//! Shared fixtures for schedule unit tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::schedule::{
    adapters::memory::InMemoryScheduleRepository,
    domain::{
        Location, NewTask, PersistedScheduleData, Schedule, ScheduleId, ScheduledSlot, Task,
        VisitStamp, VisitStatus,
    },
    services::{CreateScheduleRequest, ScheduleLifecycleService},
};
pub(super) use crate::test_support::{FixedClock, base_time};
use crate::user::{
    adapters::memory::InMemoryUserDirectory,
    domain::{User, UserId},
    ports::UserDirectory,
};

pub(super) type TestRepository = InMemoryScheduleRepository<FixedClock>;
pub(super) type TestService =
    ScheduleLifecycleService<TestRepository, InMemoryUserDirectory, FixedClock>;

pub(super) fn slot_at(start: DateTime<Utc>) -> ScheduledSlot {
    ScheduledSlot::new(start, start + Duration::hours(1)).expect("valid slot")
}

pub(super) fn home() -> Location {
    Location::new(51.5074, -0.1278)
}

pub(super) fn stamp_at(time: DateTime<Utc>) -> VisitStamp {
    VisitStamp::new(time, home())
}

pub(super) fn user(name: &str, role: &str) -> User {
    User::new(name, format!("{name}@example.com"), role, &FixedClock(base_time()))
        .expect("valid user")
}

/// Service wired to in-memory adapters with a client and a caregiver.
pub(super) struct Harness {
    pub(super) service: TestService,
    pub(super) schedules: Arc<TestRepository>,
    pub(super) users: Arc<InMemoryUserDirectory>,
    pub(super) client: UserId,
    pub(super) caregiver: UserId,
}

impl Harness {
    pub(super) async fn new() -> Self {
        let clock = FixedClock(base_time());
        let schedules = Arc::new(InMemoryScheduleRepository::new(clock));
        let users = Arc::new(InMemoryUserDirectory::new());
        let client = user("client", "client");
        let caregiver = user("carer", "caregiver");
        users.store(&client).await.expect("store client");
        users.store(&caregiver).await.expect("store caregiver");

        Self {
            service: ScheduleLifecycleService::new(
                Arc::clone(&schedules),
                Arc::clone(&users),
                Arc::new(clock),
            ),
            schedules,
            users,
            client: client.id(),
            caregiver: caregiver.id(),
        }
    }

    pub(super) async fn add_user(&self, name: &str, role: &str) -> UserId {
        let extra = user(name, role);
        self.users.store(&extra).await.expect("store user");
        extra.id()
    }

    pub(super) fn request_at(&self, start: DateTime<Utc>) -> CreateScheduleRequest {
        CreateScheduleRequest::new(self.client, self.caregiver, "Home care", slot_at(start))
            .with_task(NewTask::new("Give medication"))
            .with_task(NewTask::new("Check vitals").with_description("Blood pressure"))
    }

    pub(super) async fn create_at(&self, start: DateTime<Utc>) -> Schedule {
        self.service
            .create_schedule(self.request_at(start))
            .await
            .expect("schedule creation should succeed")
    }

    pub(super) async fn started_at(&self, start: DateTime<Utc>) -> Schedule {
        let created = self.create_at(start).await;
        self.service
            .start_schedule(created.id(), start, home())
            .await
            .expect("start should succeed")
    }
}

/// Builds a schedule in any status without going through the lifecycle.
pub(super) fn schedule_in(status: VisitStatus) -> Schedule {
    let start = base_time();
    let check_in = matches!(status, VisitStatus::InProgress | VisitStatus::Completed)
        .then(|| stamp_at(start));
    let check_out = (status == VisitStatus::Completed).then(|| stamp_at(start + Duration::hours(1)));
    Schedule::from_persisted(PersistedScheduleData {
        id: ScheduleId::new(),
        client_user_id: UserId::new(),
        assigned_user_id: UserId::new(),
        service_name: "Home care".to_owned(),
        scheduled_slot: slot_at(start),
        visit_status: status,
        check_in,
        check_out,
        tasks: Vec::<Task>::new(),
        service_note: None,
        created_at: start,
        updated_at: start,
    })
}
