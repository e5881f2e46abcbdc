//! Wire shapes for schedule and user endpoints.
//!
//! Bodies are deserialised into these types and then converted into service
//! requests, so slot bounds and sort keys are validated by the domain rather
//! than by serde.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::schedule::{
    domain::{
        DateRange, Location, NewTask, ParseSortError, ScheduleDomainError, ScheduleFilters,
        ScheduleId, ScheduleSortField, ScheduledSlot, SortDirection, TaskId, TaskPatch,
    },
    services::{CreateScheduleRequest, EndScheduleRequest, TaskOutcome, UpdateScheduleRequest},
};
use crate::user::{
    domain::{UserAddress, UserFilters, UserId, UserPatch},
    services::NewUserRequest,
};

/// Slot bounds as sent by clients.
#[derive(Debug, Deserialize)]
pub struct SlotBody {
    /// Slot start.
    pub from: DateTime<Utc>,
    /// Slot end.
    pub to: DateTime<Utc>,
}

/// Either slot bound, for partial updates.
#[derive(Debug, Default, Deserialize)]
pub struct SlotPatchBody {
    /// New slot start.
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    /// New slot end.
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

/// One task in a create request.
#[derive(Debug, Deserialize)]
pub struct NewTaskBody {
    /// Caller-chosen identifier.
    #[serde(default)]
    pub id: Option<TaskId>,
    /// Task title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
}

impl From<NewTaskBody> for NewTask {
    fn from(body: NewTaskBody) -> Self {
        let task = Self::new(body.title).with_description(body.description);
        match body.id {
            Some(id) => task.with_id(id),
            None => task,
        }
    }
}

/// Body of `POST /schedules`.
#[derive(Debug, Deserialize)]
pub struct CreateScheduleBody {
    /// Client receiving care.
    pub client_user_id: UserId,
    /// Caregiver performing the visit.
    pub assigned_user_id: UserId,
    /// Service label.
    pub service_name: String,
    /// Planned time window.
    pub scheduled_slot: SlotBody,
    /// Checklist for the visit.
    #[serde(default)]
    pub tasks: Vec<NewTaskBody>,
}

impl CreateScheduleBody {
    /// Converts the body into a service request.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::InvalidSlot`] when the slot is inverted.
    pub fn into_request(self) -> Result<CreateScheduleRequest, ScheduleDomainError> {
        let slot = ScheduledSlot::new(self.scheduled_slot.from, self.scheduled_slot.to)?;
        Ok(CreateScheduleRequest::new(
            self.client_user_id,
            self.assigned_user_id,
            self.service_name,
            slot,
        )
        .with_tasks(self.tasks.into_iter().map(NewTask::from)))
    }
}

/// Body of `PUT /schedules/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateScheduleBody {
    /// New client.
    #[serde(default)]
    pub client_user_id: Option<UserId>,
    /// New caregiver.
    #[serde(default)]
    pub assigned_user_id: Option<UserId>,
    /// New service label.
    #[serde(default)]
    pub service_name: Option<String>,
    /// New slot bounds.
    #[serde(default)]
    pub scheduled_slot: Option<SlotPatchBody>,
    /// Requested status label.
    #[serde(default)]
    pub visit_status: Option<String>,
    /// New service note.
    #[serde(default)]
    pub service_note: Option<String>,
}

impl UpdateScheduleBody {
    /// Converts the body into an update of `schedule_id`.
    #[must_use]
    pub fn into_request(self, schedule_id: ScheduleId) -> UpdateScheduleRequest {
        let mut request = UpdateScheduleRequest::new(schedule_id);
        if let Some(id) = self.client_user_id {
            request = request.with_client_user_id(id);
        }
        if let Some(id) = self.assigned_user_id {
            request = request.with_assigned_user_id(id);
        }
        if let Some(name) = self.service_name {
            request = request.with_service_name(name);
        }
        let slot = self.scheduled_slot.unwrap_or_default();
        if let Some(from) = slot.from {
            request = request.with_slot_from(from);
        }
        if let Some(to) = slot.to {
            request = request.with_slot_to(to);
        }
        if let Some(status) = self.visit_status {
            request = request.with_visit_status(status);
        }
        if let Some(note) = self.service_note {
            request = request.with_service_note(note);
        }
        request
    }
}

/// Body of `POST /schedules/{id}/start`.
#[derive(Debug, Deserialize)]
pub struct StartScheduleBody {
    /// Check-in time.
    pub timestamp: DateTime<Utc>,
    /// Check-in position.
    pub location: Location,
}

/// Task fields written by a caregiver.
#[derive(Debug, Default, Deserialize)]
pub struct TaskUpdateBody {
    /// New status label.
    #[serde(default)]
    pub status: Option<String>,
    /// Completion flag.
    #[serde(default)]
    pub done: Option<bool>,
    /// Caregiver feedback.
    #[serde(default)]
    pub feedback: Option<String>,
}

impl From<TaskUpdateBody> for TaskPatch {
    fn from(body: TaskUpdateBody) -> Self {
        let mut patch = Self::new();
        if let Some(status) = body.status {
            patch = patch.with_status(status);
        }
        if let Some(done) = body.done {
            patch = patch.with_done(done);
        }
        if let Some(feedback) = body.feedback {
            patch = patch.with_feedback(feedback);
        }
        patch
    }
}

/// One task outcome in a check-out.
#[derive(Debug, Deserialize)]
pub struct TaskOutcomeBody {
    /// Task the outcome is addressed to.
    pub id: TaskId,
    /// New status label.
    #[serde(default)]
    pub status: Option<String>,
    /// Completion flag.
    #[serde(default)]
    pub done: Option<bool>,
    /// Caregiver feedback.
    #[serde(default)]
    pub feedback: Option<String>,
}

impl From<TaskOutcomeBody> for TaskOutcome {
    fn from(body: TaskOutcomeBody) -> Self {
        let update = TaskUpdateBody {
            status: body.status,
            done: body.done,
            feedback: body.feedback,
        };
        Self::new(body.id, update.into())
    }
}

/// Body of `POST /schedules/{id}/end`.
#[derive(Debug, Deserialize)]
pub struct EndScheduleBody {
    /// Check-out time.
    pub timestamp: DateTime<Utc>,
    /// Check-out position.
    pub location: Location,
    /// Task outcomes, applied in order.
    #[serde(default)]
    pub tasks: Vec<TaskOutcomeBody>,
    /// Caregiver's service note.
    #[serde(default)]
    pub service_note: Option<String>,
}

impl From<EndScheduleBody> for EndScheduleRequest {
    fn from(body: EndScheduleBody) -> Self {
        let request = body
            .tasks
            .into_iter()
            .fold(Self::new(body.timestamp, body.location), |request, task| {
                request.with_task_outcome(task.into())
            });
        match body.service_note {
            Some(note) => request.with_service_note(note),
            None => request,
        }
    }
}

/// Query of `GET /schedules/today`.
#[derive(Debug, Deserialize)]
pub struct TodayQuery {
    /// Client whose visits are listed.
    pub client_user_id: UserId,
}

/// Query of `GET /schedules/assigned/{assigned_user_id}`.
#[derive(Debug, Default, Deserialize)]
pub struct AssignedQuery {
    /// 1-based page number.
    #[serde(default)]
    pub page: Option<u64>,
    /// Page size, clamped to the allowed maximum.
    #[serde(default)]
    pub page_size: Option<u64>,
    /// Earliest slot start, inclusive.
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    /// Slot start upper bound, exclusive.
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    /// Comma-separated sort fields.
    #[serde(default)]
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    #[serde(default)]
    pub sort_direction: Option<String>,
}

impl AssignedQuery {
    /// Converts the query into listing filters.
    ///
    /// # Errors
    ///
    /// Returns [`ParseSortError`] for an unknown sort field or direction.
    pub fn into_filters(self) -> Result<ScheduleFilters, ParseSortError> {
        let fields = self
            .sort_by
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .filter(|field| !field.trim().is_empty())
                    .map(ScheduleSortField::try_from)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();
        let direction = self
            .sort_direction
            .as_deref()
            .map(SortDirection::try_from)
            .transpose()?
            .unwrap_or_default();

        let mut filters = ScheduleFilters::new()
            .with_slot_from_range(DateRange {
                from: self.from,
                until: self.to,
            })
            .with_sort(fields, direction);
        if let Some(page) = self.page {
            filters = filters.with_page(page);
        }
        if let Some(page_size) = self.page_size {
            filters = filters.with_page_size(page_size);
        }
        Ok(filters)
    }
}

/// Body of `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    /// Login name.
    pub user_name: String,
    /// Contact email.
    pub email: String,
    /// Role label such as `client` or `caregiver`.
    pub role: String,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Profile picture URL.
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// Home address.
    #[serde(default)]
    pub address: UserAddress,
}

impl From<CreateUserBody> for NewUserRequest {
    fn from(body: CreateUserBody) -> Self {
        let request = Self::new(body.user_name, body.email, body.role)
            .with_names(body.first_name, body.last_name)
            .with_address(body.address);
        match body.profile_picture {
            Some(url) => request.with_profile_picture(url),
            None => request,
        }
    }
}

/// Body of `PUT /users/{id}`; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserBody {
    /// New login name.
    #[serde(default)]
    pub user_name: Option<String>,
    /// New email.
    #[serde(default)]
    pub email: Option<String>,
    /// New given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// New family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// New role label.
    #[serde(default)]
    pub role: Option<String>,
    /// Activation flag.
    #[serde(default)]
    pub active: Option<bool>,
    /// New profile picture URL.
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// New home address.
    #[serde(default)]
    pub address: Option<UserAddress>,
}

impl From<UpdateUserBody> for UserPatch {
    fn from(body: UpdateUserBody) -> Self {
        let mut patch = Self::new();
        if let Some(user_name) = body.user_name {
            patch = patch.with_user_name(user_name);
        }
        if let Some(email) = body.email {
            patch = patch.with_email(email);
        }
        if let Some(first_name) = body.first_name {
            patch = patch.with_first_name(first_name);
        }
        if let Some(last_name) = body.last_name {
            patch = patch.with_last_name(last_name);
        }
        if let Some(role) = body.role {
            patch = patch.with_role(role);
        }
        if let Some(active) = body.active {
            patch = patch.with_active(active);
        }
        if let Some(url) = body.profile_picture {
            patch = patch.with_profile_picture(url);
        }
        if let Some(address) = body.address {
            patch = patch.with_address(address);
        }
        patch
    }
}

/// Query of `GET /users/search`.
#[derive(Debug, Default, Deserialize)]
pub struct UserSearchQuery {
    /// Free text matched against names and email.
    #[serde(default)]
    pub q: Option<String>,
    /// Exact role label.
    #[serde(default)]
    pub role: Option<String>,
    /// 1-based page number.
    #[serde(default)]
    pub page: Option<u64>,
    /// Page size.
    #[serde(default)]
    pub page_size: Option<u64>,
}

impl From<UserSearchQuery> for UserFilters {
    fn from(query: UserSearchQuery) -> Self {
        let mut filters = Self::new();
        if let Some(text) = query.q {
            filters = filters.with_text(text);
        }
        if let Some(role) = query.role {
            filters = filters.with_role(role);
        }
        if let Some(page) = query.page {
            filters = filters.with_page(page);
        }
        if let Some(page_size) = query.page_size {
            filters = filters.with_page_size(page_size);
        }
        filters
    }
}
