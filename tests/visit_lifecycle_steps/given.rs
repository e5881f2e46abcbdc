//! Given steps for visit lifecycle BDD scenarios.

use super::world::{VisitWorld, home, run_async};
use carevisit::{
    schedule::{
        domain::{NewTask, ScheduledSlot},
        services::CreateScheduleRequest,
    },
    user::{domain::User, ports::UserDirectory},
};
use chrono::{Duration, Utc};
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest_bdd_macros::given;

#[given("a client and a caregiver")]
fn client_and_caregiver(world: &mut VisitWorld) -> Result<(), eyre::Report> {
    let client = User::new("client", "client@example.com", "client", &DefaultClock)?;
    let caregiver = User::new("carer", "carer@example.com", "caregiver", &DefaultClock)?;
    run_async(world.users.store(&client)).wrap_err("store client")?;
    run_async(world.users.store(&caregiver)).wrap_err("store caregiver")?;
    world.client = Some(client.id());
    world.caregiver = Some(caregiver.id());
    Ok(())
}

#[given("an upcoming visit starting in {minutes:u32} minutes")]
fn upcoming_visit(world: &mut VisitWorld, minutes: u32) -> Result<(), eyre::Report> {
    let client = world
        .client
        .ok_or_else(|| eyre::eyre!("missing client in scenario world"))?;
    let caregiver = world
        .caregiver
        .ok_or_else(|| eyre::eyre!("missing caregiver in scenario world"))?;
    let start = Utc::now() + Duration::minutes(i64::from(minutes));
    let slot = ScheduledSlot::new(start, start + Duration::hours(1))?;
    let request = CreateScheduleRequest::new(client, caregiver, "Home care", slot)
        .with_task(NewTask::new("Give medication"))
        .with_task(NewTask::new("Check vitals"));

    let created =
        run_async(world.service.create_schedule(request)).wrap_err("create visit for scenario")?;
    world.visits.push(created);
    Ok(())
}

#[given("the first visit has been started")]
fn first_visit_started(world: &mut VisitWorld) -> Result<(), eyre::Report> {
    let visit = world.visit(0)?;
    let started = run_async(world.service.start_schedule(
        visit.id(),
        visit.scheduled_slot().starts_at(),
        home(),
    ))
    .wrap_err("start visit in scenario setup")?;
    world.remember(&started);
    Ok(())
}

#[given("the first visit has been completed")]
fn first_visit_completed(world: &mut VisitWorld) -> Result<(), eyre::Report> {
    world.check_out_first()
}
