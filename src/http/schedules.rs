//! Schedule and task handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use mockable::Clock;

use super::{
    ApiError,
    dto::{
        AssignedQuery, CreateScheduleBody, EndScheduleBody, StartScheduleBody, TaskUpdateBody,
        TodayQuery, UpdateScheduleBody,
    },
};
use crate::schedule::{
    domain::{Schedule, ScheduleId, SchedulePage, Task, TaskId},
    ports::ScheduleRepository,
    services::{
        ScheduleLifecycleService, ScheduleWithClient, SchedulesWithClients, VisitCompletion,
    },
};
use crate::user::{domain::UserId, ports::UserDirectory};

type Service<R, U, C> = State<Arc<ScheduleLifecycleService<R, U, C>>>;
type ApiResult<T> = Result<Json<T>, ApiError>;

/// `GET /schedules`
pub async fn list<R, U, C>(State(service): Service<R, U, C>) -> ApiResult<SchedulesWithClients>
where
    R: ScheduleRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    Ok(Json(service.get_schedules_with_clients().await?))
}

/// `POST /schedules`
pub async fn create<R, U, C>(
    State(service): Service<R, U, C>,
    payload: Result<Json<CreateScheduleBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Schedule>), ApiError>
where
    R: ScheduleRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    let Json(body) = payload?;
    let schedule = service.create_schedule(body.into_request()?).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

/// `GET /schedules/today?client_user_id=`
pub async fn today_for_client<R, U, C>(
    State(service): Service<R, U, C>,
    params: Result<Query<TodayQuery>, QueryRejection>,
) -> ApiResult<SchedulesWithClients>
where
    R: ScheduleRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    let Query(query) = params?;
    Ok(Json(
        service
            .get_today_schedules_with_clients(query.client_user_id)
            .await?,
    ))
}

/// `GET /schedules/today/{assigned_user_id}`
pub async fn today_for_assignee<R, U, C>(
    State(service): Service<R, U, C>,
    path: Result<Path<UserId>, PathRejection>,
) -> ApiResult<SchedulesWithClients>
where
    R: ScheduleRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    let Path(assignee) = path?;
    Ok(Json(
        service
            .get_today_schedules_by_assignee_with_clients(assignee)
            .await?,
    ))
}

/// `GET /schedules/assigned/{assigned_user_id}`
pub async fn assigned<R, U, C>(
    State(service): Service<R, U, C>,
    path: Result<Path<UserId>, PathRejection>,
    params: Result<Query<AssignedQuery>, QueryRejection>,
) -> ApiResult<SchedulePage>
where
    R: ScheduleRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    let Path(assignee) = path?;
    let Query(query) = params?;
    let filters = query.into_filters()?;
    Ok(Json(
        service.get_schedules_by_assignee(assignee, &filters).await?,
    ))
}

/// `GET /schedules/{id}`
pub async fn show<R, U, C>(
    State(service): Service<R, U, C>,
    path: Result<Path<ScheduleId>, PathRejection>,
) -> ApiResult<ScheduleWithClient>
where
    R: ScheduleRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    let Path(id) = path?;
    Ok(Json(service.get_schedule_with_client(id).await?))
}

/// `PUT /schedules/{id}`
pub async fn update<R, U, C>(
    State(service): Service<R, U, C>,
    path: Result<Path<ScheduleId>, PathRejection>,
    payload: Result<Json<UpdateScheduleBody>, JsonRejection>,
) -> ApiResult<Schedule>
where
    R: ScheduleRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    let Path(id) = path?;
    let Json(body) = payload?;
    Ok(Json(service.update_schedule(body.into_request(id)).await?))
}

/// `POST /schedules/{id}/start`
pub async fn start<R, U, C>(
    State(service): Service<R, U, C>,
    path: Result<Path<ScheduleId>, PathRejection>,
    payload: Result<Json<StartScheduleBody>, JsonRejection>,
) -> ApiResult<Schedule>
where
    R: ScheduleRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    let Path(id) = path?;
    let Json(body) = payload?;
    Ok(Json(
        service
            .start_schedule(id, body.timestamp, body.location)
            .await?,
    ))
}

/// `POST /schedules/{id}/end`
pub async fn end<R, U, C>(
    State(service): Service<R, U, C>,
    path: Result<Path<ScheduleId>, PathRejection>,
    payload: Result<Json<EndScheduleBody>, JsonRejection>,
) -> ApiResult<VisitCompletion>
where
    R: ScheduleRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    let Path(id) = path?;
    let Json(body) = payload?;
    Ok(Json(service.end_schedule(id, body.into()).await?))
}

/// `POST /tasks/{task_id}/update`
pub async fn update_task<R, U, C>(
    State(service): Service<R, U, C>,
    path: Result<Path<TaskId>, PathRejection>,
    payload: Result<Json<TaskUpdateBody>, JsonRejection>,
) -> ApiResult<Task>
where
    R: ScheduleRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    let Path(task_id) = path?;
    let Json(body) = payload?;
    Ok(Json(service.update_task_status(task_id, body.into()).await?))
}
