//! Shared world state for visit lifecycle BDD scenarios.

use std::sync::Arc;

use carevisit::{
    schedule::{
        adapters::memory::InMemoryScheduleRepository,
        domain::{Location, Schedule, TaskPatch},
        services::{
            EndScheduleRequest, ScheduleLifecycleError, ScheduleLifecycleService, TaskOutcome,
            VisitCompletion,
        },
    },
    user::{adapters::memory::InMemoryUserDirectory, domain::UserId},
};
use chrono::{Duration, Utc};
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestVisitService = ScheduleLifecycleService<
    InMemoryScheduleRepository<DefaultClock>,
    InMemoryUserDirectory,
    DefaultClock,
>;

/// Scenario world for visit lifecycle behaviour tests.
pub struct VisitWorld {
    pub service: TestVisitService,
    pub users: Arc<InMemoryUserDirectory>,
    pub client: Option<UserId>,
    pub caregiver: Option<UserId>,
    pub visits: Vec<Schedule>,
    pub completion: Option<VisitCompletion>,
    pub last_result: Option<Result<Schedule, ScheduleLifecycleError>>,
}

impl VisitWorld {
    /// Creates a world with no users and no visits.
    #[must_use]
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUserDirectory::new());
        let service = ScheduleLifecycleService::new(
            Arc::new(InMemoryScheduleRepository::new(DefaultClock)),
            Arc::clone(&users),
            Arc::new(DefaultClock),
        );

        Self {
            service,
            users,
            client: None,
            caregiver: None,
            visits: Vec::new(),
            completion: None,
            last_result: None,
        }
    }

    /// Returns the visit created at position `index`.
    pub fn visit(&self, index: usize) -> Result<&Schedule, eyre::Report> {
        self.visits
            .get(index)
            .ok_or_else(|| eyre::eyre!("no visit #{index} in scenario world"))
    }

    /// Checks out of the first visit 45 minutes after check-in, marking
    /// its first task done.
    pub fn check_out_first(&mut self) -> Result<(), eyre::Report> {
        let visit = self.visit(0)?;
        let task = visit
            .tasks()
            .first()
            .ok_or_else(|| eyre::eyre!("visit has no tasks"))?;
        let checked_in = visit.check_in().map_or_else(Utc::now, |stamp| stamp.time);
        let request = EndScheduleRequest::new(checked_in + Duration::minutes(45), home())
            .with_task_outcome(TaskOutcome::new(
                task.id(),
                TaskPatch::new().with_status("completed").with_done(true),
            ))
            .with_service_note("Visit went well");

        let completion = run_async(self.service.end_schedule(visit.id(), request))
            .wrap_err("end visit in scenario")?;
        self.remember(&completion.schedule);
        self.completion = Some(completion);
        Ok(())
    }

    /// Replaces the stored copy of a visit after it changed.
    pub fn remember(&mut self, updated: &Schedule) {
        if let Some(slot) = self.visits.iter_mut().find(|visit| visit.id() == updated.id()) {
            *slot = updated.clone();
        }
    }
}

impl Default for VisitWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> VisitWorld {
    VisitWorld::default()
}

/// Position reported by the caregiver's device.
#[must_use]
pub const fn home() -> Location {
    Location::new(51.5074, -0.1278)
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
