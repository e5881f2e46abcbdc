//! Behaviour tests for the caregiver visit lifecycle.

#[path = "visit_lifecycle_steps/mod.rs"]
mod visit_lifecycle_steps_defs;

use rstest_bdd_macros::scenario;
use visit_lifecycle_steps_defs::world::{VisitWorld, world};

#[scenario(
    path = "tests/features/visit_lifecycle.feature",
    name = "Create a visit with pending tasks"
)]
#[tokio::test(flavor = "multi_thread")]
async fn create_visit_with_pending_tasks(world: VisitWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/visit_lifecycle.feature",
    name = "Check in at the slot start"
)]
#[tokio::test(flavor = "multi_thread")]
async fn check_in_at_slot_start(world: VisitWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/visit_lifecycle.feature",
    name = "Reject a check-in before the slot"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reject_early_check_in(world: VisitWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/visit_lifecycle.feature",
    name = "Reject a second visit for a busy caregiver"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reject_busy_caregiver(world: VisitWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/visit_lifecycle.feature",
    name = "Check out with a finished task"
)]
#[tokio::test(flavor = "multi_thread")]
async fn check_out_with_finished_task(world: VisitWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/visit_lifecycle.feature",
    name = "Cancel an upcoming visit"
)]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_upcoming_visit(world: VisitWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/visit_lifecycle.feature",
    name = "Reject reopening a completed visit"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reject_reopening_completed_visit(world: VisitWorld) {
    let _ = world;
}
