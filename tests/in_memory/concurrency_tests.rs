//! Lifecycle guarantees under concurrent commands.

use super::helpers::{Agency, home};
use carevisit::schedule::{
    domain::{ScheduleDomainError, VisitStatus},
    ports::ScheduleRepositoryError,
    services::{
        EndScheduleRequest, ErrorKind, ScheduleLifecycleError, UpdateScheduleRequest,
    },
};
use chrono::{Duration, Utc};
use eyre::ensure;

fn is_status_conflict(error: &ScheduleLifecycleError) -> bool {
    matches!(
        error,
        ScheduleLifecycleError::Repository(ScheduleRepositoryError::StatusConflict { .. })
    ) && error.kind() == ErrorKind::Validation
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_check_ins_admit_one_visit() -> eyre::Result<()> {
    let agency = Agency::new().await?;
    let start = Utc::now();
    let mut visits = Vec::new();
    for _ in 0..8 {
        visits.push(agency.create_at(start).await?);
    }

    let handles = visits
        .iter()
        .map(|visit| {
            let service = std::sync::Arc::clone(&agency.service);
            let id = visit.id();
            tokio::spawn(async move { service.start_schedule(id, start, home()).await })
        })
        .collect::<Vec<_>>();

    let mut started = Vec::new();
    for handle in handles {
        match handle.await? {
            Ok(schedule) => started.push(schedule),
            Err(ScheduleLifecycleError::Domain(ScheduleDomainError::AssigneeBusy { assignee })) => {
                ensure!(assignee == agency.caregiver);
            }
            Err(other) => return Err(other.into()),
        }
    }
    ensure!(started.len() == 1, "expected one started visit, got {}", started.len());

    let in_progress = agency
        .service
        .get_in_progress_by_assignee(agency.caregiver)
        .await?;
    ensure!(in_progress.len() == 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn caregiver_can_start_again_after_check_out() -> eyre::Result<()> {
    let agency = Agency::new().await?;
    let start = Utc::now();
    let first = agency.create_at(start).await?;
    let second = agency.create_at(start + Duration::hours(2)).await?;

    agency.service.start_schedule(first.id(), start, home()).await?;
    agency
        .service
        .end_schedule(
            first.id(),
            EndScheduleRequest::new(start + Duration::minutes(55), home()),
        )
        .await?;
    let started = agency
        .service
        .start_schedule(second.id(), start + Duration::hours(2), home())
        .await?;

    ensure!(started.visit_status() == VisitStatus::InProgress);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_check_outs_record_one_stamp() -> eyre::Result<()> {
    let agency = Agency::lockstep(2).await?;
    let start = Utc::now();
    let visit = agency.create_at(start).await?;
    agency.service.start_schedule(visit.id(), start, home()).await?;
    agency.schedules.arm();

    let handles = [30, 45].map(|minutes| {
        let service = std::sync::Arc::clone(&agency.service);
        let id = visit.id();
        let request = EndScheduleRequest::new(start + Duration::minutes(minutes), home())
            .with_service_note(format!("left after {minutes} minutes"));
        tokio::spawn(async move { service.end_schedule(id, request).await })
    });

    let mut completions = Vec::new();
    for handle in handles {
        match handle.await? {
            Ok(completion) => completions.push(completion),
            Err(error) => ensure!(is_status_conflict(&error), "unexpected error: {error}"),
        }
    }
    ensure!(completions.len() == 1, "expected one check-out, got {}", completions.len());

    let stored = agency.service.get_schedule(visit.id()).await?;
    let winner = completions
        .first()
        .map(|completion| &completion.schedule)
        .ok_or_else(|| eyre::eyre!("missing check-out"))?;
    ensure!(stored.visit_status() == VisitStatus::Completed);
    ensure!(stored.check_out() == winner.check_out());
    ensure!(stored.service_note() == winner.service_note());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn check_in_racing_cancel_takes_one_edge() -> eyre::Result<()> {
    let agency = Agency::lockstep(2).await?;
    let start = Utc::now();
    let visit = agency.create_at(start).await?;
    agency.schedules.arm();

    let starter = {
        let service = std::sync::Arc::clone(&agency.service);
        let id = visit.id();
        tokio::spawn(async move { service.start_schedule(id, start, home()).await })
    };
    let canceller = {
        let service = std::sync::Arc::clone(&agency.service);
        let request = UpdateScheduleRequest::new(visit.id()).with_visit_status("cancelled");
        tokio::spawn(async move { service.update_schedule(request).await })
    };
    let started = starter.await?;
    let cancelled = canceller.await?;

    ensure!(
        started.is_ok() != cancelled.is_ok(),
        "exactly one command must win: start ok={}, cancel ok={}",
        started.is_ok(),
        cancelled.is_ok()
    );
    for error in [started.as_ref().err(), cancelled.as_ref().err()]
        .into_iter()
        .flatten()
    {
        ensure!(is_status_conflict(error), "unexpected error: {error}");
    }

    let stored = agency.service.get_schedule(visit.id()).await?;
    if started.is_ok() {
        ensure!(stored.visit_status() == VisitStatus::InProgress);
        ensure!(stored.check_in().is_some());
    } else {
        ensure!(stored.visit_status() == VisitStatus::Cancelled);
        ensure!(stored.check_in().is_none());
    }
    Ok(())
}
