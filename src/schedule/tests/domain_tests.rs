//! Unit tests for schedule construction and value types.

use super::support::{FixedClock, base_time, slot_at};
use crate::schedule::domain::{
    DayWindow, NewScheduleData, NewTask, Schedule, ScheduleDomainError, ScheduledSlot, Task,
    TaskId, TaskPatch, VisitStatus,
};
use crate::user::domain::UserId;
use chrono::{
    Duration, FixedOffset, MappedLocalTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use eyre::ensure;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> FixedClock {
    FixedClock(base_time())
}

fn schedule_data(tasks: Vec<NewTask>) -> NewScheduleData {
    NewScheduleData {
        client_user_id: UserId::new(),
        assigned_user_id: UserId::new(),
        service_name: "Home care".to_owned(),
        scheduled_slot: slot_at(base_time()),
        tasks,
    }
}

#[rstest]
fn slot_rejects_start_after_end() {
    let from = base_time();
    let to = from - Duration::minutes(1);

    let result = ScheduledSlot::new(from, to);

    assert_eq!(result, Err(ScheduleDomainError::InvalidSlot { from, to }));
}

#[rstest]
fn slot_accepts_zero_length_window() {
    let at = base_time();
    let slot = ScheduledSlot::new(at, at).expect("equal bounds are valid");
    assert_eq!(slot.starts_at(), slot.ends_at());
}

#[rstest]
#[case(Some(1), None, true)]
#[case(None, Some(2), true)]
#[case(Some(2), None, false)]
#[case(None, Some(-1), false)]
#[case(Some(-3), Some(-2), true)]
fn slot_with_bounds_validates_merged_window(
    #[case] from_offset_hours: Option<i64>,
    #[case] to_offset_hours: Option<i64>,
    #[case] valid: bool,
) {
    let slot = slot_at(base_time());
    let from = from_offset_hours.map(|hours| base_time() + Duration::hours(hours));
    let to = to_offset_hours.map(|hours| base_time() + Duration::hours(hours));

    let merged = slot.with_bounds(from, to);

    assert_eq!(merged.is_ok(), valid);
    if let Ok(updated) = merged {
        assert_eq!(updated.starts_at(), from.unwrap_or(slot.starts_at()));
        assert_eq!(updated.ends_at(), to.unwrap_or(slot.ends_at()));
    }
}

#[rstest]
fn new_schedule_is_upcoming_with_pending_tasks(clock: FixedClock) -> eyre::Result<()> {
    let schedule = Schedule::new(
        schedule_data(vec![
            NewTask::new("  Give medication  "),
            NewTask::new("Check vitals").with_description("Blood pressure"),
        ]),
        &clock,
    )?;

    ensure!(schedule.visit_status() == VisitStatus::Upcoming);
    ensure!(schedule.check_in().is_none() && schedule.check_out().is_none());
    ensure!(schedule.created_at() == base_time());
    ensure!(schedule.tasks().len() == 2);
    for task in schedule.tasks() {
        ensure!(task.status() == Task::PENDING);
        ensure!(task.done().is_none());
        ensure!(task.feedback().is_none());
        ensure!(task.schedule_id() == schedule.id());
    }
    let titles: Vec<&str> = schedule.tasks().iter().map(Task::title).collect();
    ensure!(titles == ["Give medication", "Check vitals"]);
    Ok(())
}

#[rstest]
fn new_schedule_keeps_supplied_task_ids(clock: FixedClock) {
    let task_id = TaskId::new();
    let schedule = Schedule::new(
        schedule_data(vec![
            NewTask::new("Known").with_id(task_id),
            NewTask::new("Generated"),
        ]),
        &clock,
    )
    .expect("valid schedule");

    assert_eq!(schedule.tasks()[0].id(), task_id);
    assert_ne!(schedule.tasks()[1].id(), task_id);
    assert!(schedule.task(task_id).is_some());
}

#[rstest]
fn new_schedule_rejects_repeated_task_ids(clock: FixedClock) {
    let task_id = TaskId::new();

    let result = Schedule::new(
        schedule_data(vec![
            NewTask::new("Walk").with_id(task_id),
            NewTask::new("Lunch"),
            NewTask::new("Shower").with_id(task_id),
        ]),
        &clock,
    );

    assert_eq!(result, Err(ScheduleDomainError::DuplicateTask(task_id)));
}

#[rstest]
fn new_schedule_requires_a_task(clock: FixedClock) {
    let result = Schedule::new(schedule_data(Vec::new()), &clock);
    assert_eq!(result, Err(ScheduleDomainError::NoTasks));
}

#[rstest]
#[case("")]
#[case("   ")]
fn new_schedule_rejects_blank_task_title(clock: FixedClock, #[case] title: &str) {
    let result = Schedule::new(schedule_data(vec![NewTask::new(title)]), &clock);
    assert_eq!(result, Err(ScheduleDomainError::EmptyTaskTitle));
}

#[rstest]
fn task_patch_only_touches_present_fields(clock: FixedClock) {
    let schedule =
        Schedule::new(schedule_data(vec![NewTask::new("Walk")]), &clock).expect("valid schedule");
    let mut task = schedule.tasks()[0].clone();
    let later = base_time() + Duration::minutes(30);

    task.apply(&TaskPatch::new().with_done(true), later);

    assert_eq!(task.done(), Some(true));
    assert_eq!(task.status(), Task::PENDING);
    assert!(task.feedback().is_none());
    assert_eq!(task.updated_at(), later);
    assert!(TaskPatch::new().is_empty());
}

#[rstest]
fn day_window_spans_local_midnight_to_midnight() {
    let offset = FixedOffset::east_opt(2 * 3600).expect("valid offset");
    let late_evening = offset
        .with_ymd_and_hms(2026, 3, 2, 23, 30, 0)
        .single()
        .expect("valid local time");

    let window = DayWindow::containing(&late_evening).expect("resolvable day");

    let start = Utc
        .with_ymd_and_hms(2026, 3, 1, 22, 0, 0)
        .single()
        .expect("valid start");
    assert_eq!(window.start(), start);
    assert_eq!(window.end(), start + Duration::days(1));
    assert!(window.contains(start));
    assert!(!window.contains(window.end()));
    assert!(window.contains(late_evening.with_timezone(&Utc)));
}

/// Zone that springs from UTC-1 to UTC on 2026-03-02 at local midnight, so
/// local times from 00:00 to 00:59 that day do not exist.
#[derive(Debug, Clone, Copy)]
struct MidnightGap;

impl MidnightGap {
    fn switch_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date")
    }

    fn before() -> FixedOffset {
        FixedOffset::west_opt(3600).expect("valid offset")
    }

    fn after() -> FixedOffset {
        FixedOffset::east_opt(0).expect("valid offset")
    }
}

impl TimeZone for MidnightGap {
    type Offset = FixedOffset;

    fn from_offset(_offset: &FixedOffset) -> Self {
        Self
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> MappedLocalTime<FixedOffset> {
        self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> MappedLocalTime<FixedOffset> {
        let gap_start = Self::switch_day().and_time(NaiveTime::MIN);
        if *local < gap_start {
            MappedLocalTime::Single(Self::before())
        } else if *local < gap_start + Duration::hours(1) {
            MappedLocalTime::None
        } else {
            MappedLocalTime::Single(Self::after())
        }
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
        self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
        let switch = Self::switch_day().and_time(NaiveTime::MIN) + Duration::hours(1);
        if *utc < switch {
            Self::before()
        } else {
            Self::after()
        }
    }
}

#[rstest]
fn day_window_starts_after_a_gap_over_midnight() {
    let morning = Utc
        .with_ymd_and_hms(2026, 3, 2, 10, 0, 0)
        .single()
        .expect("valid instant")
        .with_timezone(&MidnightGap);

    let window = DayWindow::containing(&morning).expect("day with a gap is resolvable");

    let first_valid = Utc
        .with_ymd_and_hms(2026, 3, 2, 1, 0, 0)
        .single()
        .expect("valid start");
    let next_midnight = Utc
        .with_ymd_and_hms(2026, 3, 3, 0, 0, 0)
        .single()
        .expect("valid end");
    assert_eq!(window.start(), first_valid);
    assert_eq!(window.end(), next_midnight);
    assert!(window.contains(morning.with_timezone(&Utc)));
}
