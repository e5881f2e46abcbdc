//! Then steps for visit lifecycle BDD scenarios.

use super::world::{VisitWorld, run_async};
use carevisit::schedule::{
    domain::{Task, VisitStatus},
    services::ErrorKind,
};
use rstest_bdd_macros::then;

#[then(r#"the visit status is "{status}""#)]
fn visit_status_is(world: &VisitWorld, status: String) -> Result<(), eyre::Report> {
    let expected = VisitStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let id = world.visit(0)?.id();
    let stored = run_async(world.service.get_schedule(id))?;

    if stored.visit_status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            stored.visit_status()
        ));
    }
    Ok(())
}

#[then("every task is pending")]
fn every_task_pending(world: &VisitWorld) -> Result<(), eyre::Report> {
    let visit = world.visit(0)?;
    if visit.tasks().iter().any(|task| task.status() != Task::PENDING) {
        return Err(eyre::eyre!("expected pending tasks, got {:?}", visit.tasks()));
    }
    Ok(())
}

#[then("the visit has a check-in stamp")]
fn has_check_in(world: &VisitWorld) -> Result<(), eyre::Report> {
    let visit = world.visit(0)?;
    if visit.check_in().is_none() {
        return Err(eyre::eyre!("expected a check-in stamp on {}", visit.id()));
    }
    Ok(())
}

#[then("the first task is done")]
fn first_task_done(world: &VisitWorld) -> Result<(), eyre::Report> {
    let visit = world.visit(0)?;
    let task = visit
        .tasks()
        .first()
        .ok_or_else(|| eyre::eyre!("visit has no tasks"))?;
    if task.done() != Some(true) || task.status() != "completed" {
        return Err(eyre::eyre!("expected first task done, got {task:?}"));
    }
    Ok(())
}

#[then("every task outcome was applied")]
fn every_outcome_applied(world: &VisitWorld) -> Result<(), eyre::Report> {
    let completion = world
        .completion
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing visit completion"))?;
    if !completion.all_tasks_updated() {
        return Err(eyre::eyre!(
            "task outcomes failed: {:?}",
            completion.failed_task_updates
        ));
    }
    Ok(())
}

#[then("the request fails with a validation error")]
fn fails_with_validation_error(world: &VisitWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing request result"))?;

    match result {
        Err(error) if error.kind() == ErrorKind::Validation => Ok(()),
        other => Err(eyre::eyre!("expected a validation error, got {other:?}")),
    }
}
