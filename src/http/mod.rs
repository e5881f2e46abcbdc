//! JSON-over-HTTP surface for the visit lifecycle and user management
//! services.
//!
//! Handlers are thin: they decode the request, call one service operation
//! and map [`crate::schedule::services::ErrorKind`] onto a status code
//! (`NotFound` → 404, `Validation` → 400, `Repository` → 500). User errors
//! follow the same split. Malformed paths, queries and bodies are rejected
//! with 400.

mod dto;
mod error;
mod schedules;
mod users;

use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{get, post},
};
use mockable::Clock;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::schedule::{ports::ScheduleRepository, services::ScheduleLifecycleService};
use crate::user::{ports::UserDirectory, services::UserManagementService};

pub use dto::{
    AssignedQuery, CreateScheduleBody, CreateUserBody, EndScheduleBody, NewTaskBody, SlotBody,
    SlotPatchBody, StartScheduleBody, TaskOutcomeBody, TaskUpdateBody, TodayQuery,
    UpdateScheduleBody, UpdateUserBody, UserSearchQuery,
};
pub use error::{ApiError, ErrorBody};

/// Assembles the router over the shared lifecycle and user services.
pub fn router<R, U, C>(
    schedules: Arc<ScheduleLifecycleService<R, U, C>>,
    users: Arc<UserManagementService<U, C>>,
) -> Router
where
    R: ScheduleRepository + 'static,
    U: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .merge(schedule_routes(schedules))
        .merge(user_routes(users))
        .layer(TraceLayer::new_for_http())
}

fn schedule_routes<R, U, C>(service: Arc<ScheduleLifecycleService<R, U, C>>) -> Router
where
    R: ScheduleRepository + 'static,
    U: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/schedules",
            get(schedules::list::<R, U, C>).post(schedules::create::<R, U, C>),
        )
        .route(
            "/schedules/today",
            get(schedules::today_for_client::<R, U, C>),
        )
        .route(
            "/schedules/today/{assigned_user_id}",
            get(schedules::today_for_assignee::<R, U, C>),
        )
        .route(
            "/schedules/assigned/{assigned_user_id}",
            get(schedules::assigned::<R, U, C>),
        )
        .route(
            "/schedules/{id}",
            get(schedules::show::<R, U, C>).put(schedules::update::<R, U, C>),
        )
        .route("/schedules/{id}/start", post(schedules::start::<R, U, C>))
        .route("/schedules/{id}/end", post(schedules::end::<R, U, C>))
        .route(
            "/tasks/{task_id}/update",
            post(schedules::update_task::<R, U, C>),
        )
        .with_state(service)
}

fn user_routes<U, C>(service: Arc<UserManagementService<U, C>>) -> Router
where
    U: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/users", get(users::list::<U, C>).post(users::create::<U, C>))
        .route("/users/search", get(users::search::<U, C>))
        .route(
            "/users/{id}",
            get(users::show::<U, C>)
                .put(users::update::<U, C>)
                .delete(users::delete::<U, C>),
        )
        .with_state(service)
}

/// `GET /health`
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
