//! End-to-end visit lifecycle tests against in-memory adapters.

use super::helpers::{Agency, home, runtime};
use carevisit::{
    schedule::{
        domain::{TaskPatch, VisitStatus},
        services::{
            EndScheduleRequest, ScheduleLifecycleError, TaskOutcome, UpdateScheduleRequest,
            UserRole,
        },
    },
    user::domain::UserId,
};
use chrono::{Duration, Utc};
use eyre::{bail, ensure};
use rstest::rstest;
use std::io;
use tokio::runtime::Runtime;

#[rstest]
fn visit_completes_and_reports_foreign_task_outcome(
    runtime: io::Result<Runtime>,
) -> eyre::Result<()> {
    let rt = runtime?;
    rt.block_on(async {
        let agency = Agency::new().await?;
        let start = Utc::now();
        let visit = agency.create_at(start).await?;
        let other = agency.create_at(start + Duration::hours(3)).await?;
        let own_task = visit.tasks().first().map(|task| task.id());
        let foreign_task = other.tasks().first().map(|task| task.id());
        let (Some(own_task), Some(foreign_task)) = (own_task, foreign_task) else {
            bail!("created visits should carry tasks");
        };

        agency.service.start_schedule(visit.id(), start, home()).await?;
        let done = TaskPatch::new().with_status("completed").with_done(true);
        let request = EndScheduleRequest::new(start + Duration::minutes(40), home())
            .with_task_outcome(TaskOutcome::new(own_task, done.clone()))
            .with_task_outcome(TaskOutcome::new(foreign_task, done))
            .with_service_note("Client in good spirits");
        let completion = agency.service.end_schedule(visit.id(), request).await?;

        ensure!(completion.schedule.visit_status() == VisitStatus::Completed);
        ensure!(completion.schedule.service_note() == Some("Client in good spirits"));
        ensure!(completion.schedule.task(own_task).and_then(|task| task.done()) == Some(true));
        ensure!(completion.failed_task_updates.len() == 1);
        ensure!(
            completion
                .failed_task_updates
                .first()
                .is_some_and(|failure| failure.task_id == foreign_task)
        );

        let untouched = agency.service.get_schedule(other.id()).await?;
        ensure!(untouched.task(foreign_task).and_then(|task| task.done()).is_none());
        Ok(())
    })
}

#[rstest]
fn reassigning_to_unknown_caregiver_changes_nothing(
    runtime: io::Result<Runtime>,
) -> eyre::Result<()> {
    let rt = runtime?;
    rt.block_on(async {
        let agency = Agency::new().await?;
        let visit = agency.create_at(Utc::now() + Duration::hours(1)).await?;
        let stranger = UserId::new();

        let result = agency
            .service
            .update_schedule(
                UpdateScheduleRequest::new(visit.id())
                    .with_service_name("Night care")
                    .with_assigned_user_id(stranger),
            )
            .await;

        ensure!(matches!(
            result,
            Err(ScheduleLifecycleError::UserNotFound {
                role: UserRole::Assigned,
                id,
            }) if id == stranger
        ));
        ensure!(agency.service.get_schedule(visit.id()).await? == visit);
        Ok(())
    })
}

#[rstest]
fn reassigned_visit_frees_original_caregiver(runtime: io::Result<Runtime>) -> eyre::Result<()> {
    let rt = runtime?;
    rt.block_on(async {
        let agency = Agency::new().await?;
        let relief = carevisit::user::domain::User::new(
            "relief",
            "relief@example.com",
            "caregiver",
            &mockable::DefaultClock,
        )?;
        carevisit::user::ports::UserDirectory::store(&*agency.users, &relief).await?;

        let start = Utc::now();
        let first = agency.create_at(start).await?;
        let second = agency.create_at(start).await?;
        agency
            .service
            .update_schedule(UpdateScheduleRequest::new(second.id()).with_assigned_user_id(relief.id()))
            .await?;

        agency.service.start_schedule(first.id(), start, home()).await?;
        let started = agency.service.start_schedule(second.id(), start, home()).await?;
        ensure!(started.assigned_user_id() == relief.id());
        ensure!(started.visit_status() == VisitStatus::InProgress);
        Ok(())
    })
}
