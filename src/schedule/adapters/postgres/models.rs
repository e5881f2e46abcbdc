//! Diesel row models for schedule persistence.

use super::schema::{schedule_tasks, schedules};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row model shared by reads and inserts of schedule records.
///
/// Field order matches the table so boxed queries can load it positionally.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = schedules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ScheduleRow {
    /// Schedule identifier.
    pub id: uuid::Uuid,
    /// Client receiving care.
    pub client_user_id: uuid::Uuid,
    /// Caregiver performing the visit.
    pub assigned_user_id: uuid::Uuid,
    /// Service label.
    pub service_name: String,
    /// Planned slot start.
    pub scheduled_slot_from: DateTime<Utc>,
    /// Planned slot end.
    pub scheduled_slot_to: DateTime<Utc>,
    /// Lifecycle status label.
    pub visit_status: String,
    /// Check-in instant.
    pub check_in_time: Option<DateTime<Utc>>,
    /// Check-in latitude.
    pub check_in_lat: Option<f64>,
    /// Check-in longitude.
    pub check_in_long: Option<f64>,
    /// Check-out instant.
    pub check_out_time: Option<DateTime<Utc>>,
    /// Check-out latitude.
    pub check_out_lat: Option<f64>,
    /// Check-out longitude.
    pub check_out_long: Option<f64>,
    /// Caregiver note.
    pub service_note: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model shared by reads and inserts of task records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = schedule_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning schedule.
    pub schedule_id: uuid::Uuid,
    /// Order within the schedule.
    pub position: i32,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Status label.
    pub status: String,
    /// Completion flag.
    pub done: Option<bool>,
    /// Feedback.
    pub feedback: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a schedule row; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schedules)]
pub struct ScheduleChangeset {
    /// New client.
    pub client_user_id: Option<uuid::Uuid>,
    /// New assignee.
    pub assigned_user_id: Option<uuid::Uuid>,
    /// New service label.
    pub service_name: Option<String>,
    /// New slot start.
    pub scheduled_slot_from: Option<DateTime<Utc>>,
    /// New slot end.
    pub scheduled_slot_to: Option<DateTime<Utc>>,
    /// New status label.
    pub visit_status: Option<String>,
    /// Check-in instant.
    pub check_in_time: Option<DateTime<Utc>>,
    /// Check-in latitude.
    pub check_in_lat: Option<f64>,
    /// Check-in longitude.
    pub check_in_long: Option<f64>,
    /// Check-out instant.
    pub check_out_time: Option<DateTime<Utc>>,
    /// Check-out latitude.
    pub check_out_lat: Option<f64>,
    /// Check-out longitude.
    pub check_out_long: Option<f64>,
    /// Caregiver note.
    pub service_note: Option<String>,
    /// Update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a task row; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schedule_tasks)]
pub struct TaskChangeset {
    /// New status label.
    pub status: Option<String>,
    /// New completion flag.
    pub done: Option<bool>,
    /// New feedback.
    pub feedback: Option<String>,
    /// Update timestamp.
    pub updated_at: DateTime<Utc>,
}
