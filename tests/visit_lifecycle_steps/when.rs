//! When steps for visit lifecycle BDD scenarios.

use super::world::{VisitWorld, home, run_async};
use carevisit::schedule::{domain::ScheduleId, services::UpdateScheduleRequest};
use chrono::{DateTime, Duration, Utc};
use rstest_bdd_macros::when;

fn check_in(world: &mut VisitWorld, id: ScheduleId, at: DateTime<Utc>) {
    let result = run_async(world.service.start_schedule(id, at, home()));
    if let Ok(ref updated) = result {
        world.remember(updated);
    }
    world.last_result = Some(result);
}

#[when("the caregiver checks in at the slot start")]
fn checks_in_on_time(world: &mut VisitWorld) -> Result<(), eyre::Report> {
    let visit = world.visit(0)?;
    let (id, at) = (visit.id(), visit.scheduled_slot().starts_at());
    check_in(world, id, at);
    Ok(())
}

#[when("the caregiver checks in {minutes:u32} minutes before the slot")]
fn checks_in_early(world: &mut VisitWorld, minutes: u32) -> Result<(), eyre::Report> {
    let visit = world.visit(0)?;
    let at = visit.scheduled_slot().starts_at() - Duration::minutes(i64::from(minutes));
    let id = visit.id();
    check_in(world, id, at);
    Ok(())
}

#[when("the caregiver checks into the second visit")]
fn checks_into_second_visit(world: &mut VisitWorld) -> Result<(), eyre::Report> {
    let visit = world.visit(1)?;
    let (id, at) = (visit.id(), visit.scheduled_slot().starts_at());
    check_in(world, id, at);
    Ok(())
}

#[when("the caregiver checks out marking the first task done")]
fn checks_out(world: &mut VisitWorld) -> Result<(), eyre::Report> {
    world.check_out_first()
}

#[when(r#"the visit status is updated to "{status}""#)]
fn status_updated(world: &mut VisitWorld, status: String) -> Result<(), eyre::Report> {
    let id = world.visit(0)?.id();
    let result = run_async(
        world
            .service
            .update_schedule(UpdateScheduleRequest::new(id).with_visit_status(status)),
    );
    if let Ok(ref updated) = result {
        world.remember(updated);
    }
    world.last_result = Some(result);
    Ok(())
}
