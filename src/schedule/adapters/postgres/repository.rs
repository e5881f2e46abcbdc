//! `PostgreSQL` repository implementation for schedule storage.

use super::{
    models::{ScheduleChangeset, ScheduleRow, TaskChangeset, TaskRow},
    schema::{schedule_tasks, schedules},
};
use crate::schedule::{
    domain::{
        DayWindow, Location, PersistedScheduleData, PersistedTaskData, Schedule, ScheduleFilters,
        ScheduleId, SchedulePage, SchedulePatch, ScheduleSortField, ScheduledSlot, SortDirection,
        Task, TaskId, TaskPatch, VisitStamp, VisitStatus,
    },
    ports::{ScheduleRepository, ScheduleRepositoryError, ScheduleRepositoryResult},
};
use crate::user::domain::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::query_builder::QueryFragment;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use mockable::Clock;
use std::collections::HashMap;
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by schedule adapters.
pub type SchedulePgPool = Pool<ConnectionManager<PgConnection>>;

type BoxedScheduleQuery = schedules::BoxedQuery<'static, Pg>;

const SINGLE_IN_PROGRESS_INDEX: &str = "idx_schedules_single_in_progress";
const TASK_PRIMARY_KEY: &str = "schedule_tasks_pkey";

/// `PostgreSQL`-backed schedule repository.
///
/// Schedules and their tasks are written in one transaction. Single
/// occupancy is enforced by a partial unique index on in-progress rows.
/// Conditional patches lock the row and only update it while it still holds
/// the expected status.
#[derive(Debug, Clone)]
pub struct PostgresScheduleRepository<C: Clock + Send + Sync> {
    pool: SchedulePgPool,
    clock: C,
}

impl<C: Clock + Send + Sync> PostgresScheduleRepository<C> {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: SchedulePgPool, clock: C) -> Self {
        Self { pool, clock }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ScheduleRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ScheduleRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ScheduleRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ScheduleRepositoryError::persistence)?
    }
}

impl From<DieselError> for ScheduleRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> ScheduleRepository for PostgresScheduleRepository<C> {
    async fn list_all(&self) -> ScheduleRepositoryResult<Vec<Schedule>> {
        self.run_blocking(|connection| {
            let rows = schedules::table
                .order((schedules::scheduled_slot_from.asc(), schedules::id.asc()))
                .select(ScheduleRow::as_select())
                .load::<ScheduleRow>(connection)?;
            attach_tasks(connection, rows)
        })
        .await
    }

    async fn find_by_id(&self, id: ScheduleId) -> ScheduleRepositoryResult<Option<Schedule>> {
        self.run_blocking(move |connection| load_schedule(connection, id))
            .await
    }

    async fn find_for_client_between(
        &self,
        client: UserId,
        window: DayWindow,
    ) -> ScheduleRepositoryResult<Vec<Schedule>> {
        self.run_blocking(move |connection| {
            let rows = schedules::table
                .filter(schedules::client_user_id.eq(client.into_inner()))
                .filter(schedules::scheduled_slot_from.ge(window.start()))
                .filter(schedules::scheduled_slot_from.lt(window.end()))
                .order((schedules::scheduled_slot_from.asc(), schedules::id.asc()))
                .select(ScheduleRow::as_select())
                .load::<ScheduleRow>(connection)?;
            attach_tasks(connection, rows)
        })
        .await
    }

    async fn find_in_progress_by_assignee(
        &self,
        assignee: UserId,
    ) -> ScheduleRepositoryResult<Vec<Schedule>> {
        self.run_blocking(move |connection| {
            let rows = schedules::table
                .filter(schedules::assigned_user_id.eq(assignee.into_inner()))
                .filter(schedules::visit_status.eq(VisitStatus::InProgress.as_str()))
                .order((schedules::scheduled_slot_from.asc(), schedules::id.asc()))
                .select(ScheduleRow::as_select())
                .load::<ScheduleRow>(connection)?;
            attach_tasks(connection, rows)
        })
        .await
    }

    async fn find_by_assignee_paginated(
        &self,
        assignee: UserId,
        filters: &ScheduleFilters,
    ) -> ScheduleRepositoryResult<SchedulePage> {
        let assignee_uuid = assignee.into_inner();
        let owned = filters.clone();

        self.run_blocking(move |connection| {
            let range = owned.slot_from_range();

            let mut count_query = schedules::table
                .filter(schedules::assigned_user_id.eq(assignee_uuid))
                .count()
                .into_boxed();
            let mut query: BoxedScheduleQuery = schedules::table
                .filter(schedules::assigned_user_id.eq(assignee_uuid))
                .into_boxed();
            if let Some(from) = range.from {
                count_query = count_query.filter(schedules::scheduled_slot_from.ge(from));
                query = query.filter(schedules::scheduled_slot_from.ge(from));
            }
            if let Some(until) = range.until {
                count_query = count_query.filter(schedules::scheduled_slot_from.lt(until));
                query = query.filter(schedules::scheduled_slot_from.lt(until));
            }

            for field in owned.sort_by() {
                query = order_by_field(query, *field, owned.direction());
            }
            query = query
                .then_order_by(schedules::scheduled_slot_from.asc())
                .then_order_by(schedules::id.asc());

            let limit =
                i64::try_from(owned.page_size()).map_err(ScheduleRepositoryError::persistence)?;
            let offset =
                i64::try_from(owned.offset()).map_err(ScheduleRepositoryError::persistence)?;

            let total_rows = count_query.get_result::<i64>(connection)?;
            let rows = query
                .limit(limit)
                .offset(offset)
                .load::<ScheduleRow>(connection)?;
            let data = attach_tasks(connection, rows)?;
            let total = u64::try_from(total_rows).map_err(ScheduleRepositoryError::persistence)?;
            Ok(SchedulePage::new(data, total, &owned))
        })
        .await
    }

    async fn update(
        &self,
        id: ScheduleId,
        patch: &SchedulePatch,
    ) -> ScheduleRepositoryResult<Schedule> {
        let changeset = to_changeset(patch, self.clock.utc());
        let patched_assignee = patch.assigned_user_id();
        let expected_status = patch.expected_status();

        self.run_blocking(move |connection| {
            connection.transaction::<_, ScheduleRepositoryError, _>(|tx| {
                let (current_assignee, current_status) = schedules::table
                    .find(id.into_inner())
                    .select((schedules::assigned_user_id, schedules::visit_status))
                    .for_update()
                    .first::<(Uuid, String)>(tx)
                    .optional()?
                    .ok_or(ScheduleRepositoryError::NotFound(id))?;
                let actual = VisitStatus::try_from(current_status.as_str())
                    .map_err(ScheduleRepositoryError::persistence)?;
                if let Some(expected) = expected_status
                    && actual != expected
                {
                    return Err(ScheduleRepositoryError::StatusConflict {
                        id,
                        expected,
                        actual,
                    });
                }
                let assignee =
                    patched_assignee.unwrap_or_else(|| UserId::from_uuid(current_assignee));

                let target = schedules::table.find(id.into_inner());
                let affected = match expected_status {
                    Some(expected) => diesel::update(
                        target.filter(schedules::visit_status.eq(expected.as_str())),
                    )
                    .set(&changeset)
                    .execute(tx),
                    None => diesel::update(target).set(&changeset).execute(tx),
                }
                .map_err(|err| map_schedule_write_error(err, id, assignee))?;
                if affected == 0
                    && let Some(expected) = expected_status
                {
                    return Err(ScheduleRepositoryError::StatusConflict {
                        id,
                        expected,
                        actual,
                    });
                }

                load_schedule(tx, id)?.ok_or(ScheduleRepositoryError::NotFound(id))
            })
        })
        .await
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> ScheduleRepositoryResult<Task> {
        let changeset = TaskChangeset {
            status: patch.status().map(str::to_owned),
            done: patch.done(),
            feedback: patch.feedback().map(str::to_owned),
            updated_at: self.clock.utc(),
        };

        self.run_blocking(move |connection| {
            let row = diesel::update(schedule_tasks::table.find(id.into_inner()))
                .set(&changeset)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task)
                .ok_or(ScheduleRepositoryError::TaskNotFound(id))
        })
        .await
    }

    async fn create(&self, schedule: &Schedule) -> ScheduleRepositoryResult<Schedule> {
        let schedule_id = schedule.id();
        let assignee = schedule.assigned_user_id();
        let row = to_schedule_row(schedule);
        let task_rows = to_task_rows(schedule)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, ScheduleRepositoryError, _>(|tx| {
                let task_ids: Vec<Uuid> = task_rows.iter().map(|task| task.id).collect();
                let taken = schedule_tasks::table
                    .filter(schedule_tasks::id.eq_any(task_ids))
                    .select(schedule_tasks::id)
                    .first::<Uuid>(tx)
                    .optional()?;
                if let Some(task_id) = taken {
                    return Err(ScheduleRepositoryError::DuplicateTask(TaskId::from_uuid(
                        task_id,
                    )));
                }

                diesel::insert_into(schedules::table)
                    .values(&row)
                    .execute(tx)
                    .map_err(|err| map_schedule_write_error(err, schedule_id, assignee))?;
                diesel::insert_into(schedule_tasks::table)
                    .values(&task_rows)
                    .execute(tx)
                    .map_err(map_task_insert_error)?;

                load_schedule(tx, schedule_id)?
                    .ok_or(ScheduleRepositoryError::NotFound(schedule_id))
            })
        })
        .await
    }
}

fn load_schedule(
    connection: &mut PgConnection,
    id: ScheduleId,
) -> ScheduleRepositoryResult<Option<Schedule>> {
    let row = schedules::table
        .find(id.into_inner())
        .select(ScheduleRow::as_select())
        .first::<ScheduleRow>(connection)
        .optional()?;
    match row {
        Some(found) => Ok(attach_tasks(connection, vec![found])?.pop()),
        None => Ok(None),
    }
}

fn attach_tasks(
    connection: &mut PgConnection,
    rows: Vec<ScheduleRow>,
) -> ScheduleRepositoryResult<Vec<Schedule>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let task_rows = schedule_tasks::table
        .filter(schedule_tasks::schedule_id.eq_any(ids))
        .order((
            schedule_tasks::schedule_id.asc(),
            schedule_tasks::position.asc(),
        ))
        .select(TaskRow::as_select())
        .load::<TaskRow>(connection)?;

    let mut tasks_by_schedule: HashMap<Uuid, Vec<Task>> = HashMap::new();
    for task_row in task_rows {
        tasks_by_schedule
            .entry(task_row.schedule_id)
            .or_default()
            .push(row_to_task(task_row));
    }

    rows.into_iter()
        .map(|row| {
            let tasks = tasks_by_schedule.remove(&row.id).unwrap_or_default();
            row_to_schedule(row, tasks)
        })
        .collect()
}

fn order_by_field(
    query: BoxedScheduleQuery,
    field: ScheduleSortField,
    direction: SortDirection,
) -> BoxedScheduleQuery {
    match field {
        ScheduleSortField::ScheduledSlotFrom => {
            order_column(query, schedules::scheduled_slot_from, direction)
        }
        ScheduleSortField::ScheduledSlotTo => {
            order_column(query, schedules::scheduled_slot_to, direction)
        }
        ScheduleSortField::ServiceName => order_column(query, schedules::service_name, direction),
        ScheduleSortField::VisitStatus => order_column(query, schedules::visit_status, direction),
        ScheduleSortField::CreatedAt => order_column(query, schedules::created_at, direction),
        ScheduleSortField::UpdatedAt => order_column(query, schedules::updated_at, direction),
    }
}

fn order_column<Col>(
    query: BoxedScheduleQuery,
    column: Col,
    direction: SortDirection,
) -> BoxedScheduleQuery
where
    Col: ExpressionMethods + QueryFragment<Pg> + AppearsOnTable<schedules::table> + Send + 'static,
{
    match direction {
        SortDirection::Asc => query.then_order_by(column.asc()),
        SortDirection::Desc => query.then_order_by(column.desc()),
    }
}

fn map_schedule_write_error(
    err: DieselError,
    schedule_id: ScheduleId,
    assignee: UserId,
) -> ScheduleRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_single_in_progress_violation(info.as_ref()) =>
        {
            ScheduleRepositoryError::AssigneeBusy(assignee)
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ScheduleRepositoryError::DuplicateSchedule(schedule_id)
        }
        _ => ScheduleRepositoryError::persistence(err),
    }
}

fn map_task_insert_error(err: DieselError) -> ScheduleRepositoryError {
    let duplicate = match &err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(TASK_PRIMARY_KEY) =>
        {
            duplicate_task_from_detail(info.as_ref())
        }
        _ => None,
    };
    duplicate.map_or_else(
        || ScheduleRepositoryError::persistence(err),
        ScheduleRepositoryError::DuplicateTask,
    )
}

/// Reads the task identifier out of a `Key (id)=(...)` violation detail.
fn duplicate_task_from_detail(info: &dyn DatabaseErrorInformation) -> Option<TaskId> {
    let detail = info.details()?;
    let (_, rest) = detail.split_once("=(")?;
    let (raw, _) = rest.split_once(')')?;
    Uuid::parse_str(raw).ok().map(TaskId::from_uuid)
}

fn is_single_in_progress_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == SINGLE_IN_PROGRESS_INDEX)
}

fn to_schedule_row(schedule: &Schedule) -> ScheduleRow {
    let slot = schedule.scheduled_slot();
    let check_in = schedule.check_in();
    let check_out = schedule.check_out();
    ScheduleRow {
        id: schedule.id().into_inner(),
        client_user_id: schedule.client_user_id().into_inner(),
        assigned_user_id: schedule.assigned_user_id().into_inner(),
        service_name: schedule.service_name().to_owned(),
        scheduled_slot_from: slot.starts_at(),
        scheduled_slot_to: slot.ends_at(),
        visit_status: schedule.visit_status().as_str().to_owned(),
        check_in_time: check_in.map(|stamp| stamp.time),
        check_in_lat: check_in.map(|stamp| stamp.location.lat),
        check_in_long: check_in.map(|stamp| stamp.location.long),
        check_out_time: check_out.map(|stamp| stamp.time),
        check_out_lat: check_out.map(|stamp| stamp.location.lat),
        check_out_long: check_out.map(|stamp| stamp.location.long),
        service_note: schedule.service_note().map(str::to_owned),
        created_at: schedule.created_at(),
        updated_at: schedule.updated_at(),
    }
}

fn to_task_rows(schedule: &Schedule) -> ScheduleRepositoryResult<Vec<TaskRow>> {
    schedule
        .tasks()
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let position = i32::try_from(index).map_err(ScheduleRepositoryError::persistence)?;
            Ok(TaskRow {
                id: task.id().into_inner(),
                schedule_id: schedule.id().into_inner(),
                position,
                title: task.title().to_owned(),
                description: task.description().to_owned(),
                status: task.status().to_owned(),
                done: task.done(),
                feedback: task.feedback().map(str::to_owned),
                created_at: task.created_at(),
                updated_at: task.updated_at(),
            })
        })
        .collect()
}

fn to_changeset(patch: &SchedulePatch, timestamp: DateTime<Utc>) -> ScheduleChangeset {
    let slot = patch.scheduled_slot();
    let check_in = patch.check_in();
    let check_out = patch.check_out();
    ScheduleChangeset {
        client_user_id: patch.client_user_id().map(UserId::into_inner),
        assigned_user_id: patch.assigned_user_id().map(UserId::into_inner),
        service_name: patch.service_name_value().map(str::to_owned),
        scheduled_slot_from: slot.map(|value| value.starts_at()),
        scheduled_slot_to: slot.map(|value| value.ends_at()),
        visit_status: patch.visit_status().map(|status| status.as_str().to_owned()),
        check_in_time: check_in.map(|stamp| stamp.time),
        check_in_lat: check_in.map(|stamp| stamp.location.lat),
        check_in_long: check_in.map(|stamp| stamp.location.long),
        check_out_time: check_out.map(|stamp| stamp.time),
        check_out_lat: check_out.map(|stamp| stamp.location.lat),
        check_out_long: check_out.map(|stamp| stamp.location.long),
        service_note: patch.service_note().map(str::to_owned),
        updated_at: timestamp,
    }
}

fn stamp_from_columns(
    time: Option<DateTime<Utc>>,
    lat: Option<f64>,
    long: Option<f64>,
) -> Option<VisitStamp> {
    match (time, lat, long) {
        (Some(recorded), Some(latitude), Some(longitude)) => Some(VisitStamp::new(
            recorded,
            Location::new(latitude, longitude),
        )),
        _ => None,
    }
}

fn row_to_schedule(row: ScheduleRow, tasks: Vec<Task>) -> ScheduleRepositoryResult<Schedule> {
    let visit_status = VisitStatus::try_from(row.visit_status.as_str())
        .map_err(ScheduleRepositoryError::persistence)?;
    let scheduled_slot = ScheduledSlot::new(row.scheduled_slot_from, row.scheduled_slot_to)
        .map_err(ScheduleRepositoryError::persistence)?;

    Ok(Schedule::from_persisted(PersistedScheduleData {
        id: ScheduleId::from_uuid(row.id),
        client_user_id: UserId::from_uuid(row.client_user_id),
        assigned_user_id: UserId::from_uuid(row.assigned_user_id),
        service_name: row.service_name,
        scheduled_slot,
        visit_status,
        check_in: stamp_from_columns(row.check_in_time, row.check_in_lat, row.check_in_long),
        check_out: stamp_from_columns(row.check_out_time, row.check_out_lat, row.check_out_long),
        tasks,
        service_note: row.service_note,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn row_to_task(row: TaskRow) -> Task {
    Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        schedule_id: ScheduleId::from_uuid(row.schedule_id),
        title: row.title,
        description: row.description,
        status: row.status,
        done: row.done,
        feedback: row.feedback,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
