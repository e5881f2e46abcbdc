//! Per-visit task entity and its patch type.

use super::{ScheduleDomainError, ScheduleId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unit of in-visit work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    schedule_id: ScheduleId,
    title: String,
    description: String,
    status: String,
    done: Option<bool>,
    feedback: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Task definition supplied when a schedule is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    id: Option<TaskId>,
    title: String,
    description: String,
}

impl NewTask {
    /// Creates a task definition with a title and no description.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Uses a caller-chosen identifier instead of a generated one.
    #[must_use]
    pub const fn with_id(mut self, id: TaskId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning schedule.
    pub schedule_id: ScheduleId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: String,
    /// Persisted status label.
    pub status: String,
    /// Persisted completion flag.
    pub done: Option<bool>,
    /// Persisted caregiver feedback.
    pub feedback: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Status label given to every task at creation.
    pub const PENDING: &'static str = "pending";

    /// Builds a pending task for `schedule_id` from its definition.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::EmptyTaskTitle`] when the title is
    /// blank.
    pub(crate) fn from_new(
        definition: NewTask,
        schedule_id: ScheduleId,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ScheduleDomainError> {
        let title = definition.title.trim().to_owned();
        if title.is_empty() {
            return Err(ScheduleDomainError::EmptyTaskTitle);
        }

        Ok(Self {
            id: definition.id.unwrap_or_default(),
            schedule_id,
            title,
            description: definition.description,
            status: Self::PENDING.to_owned(),
            done: None,
            feedback: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            schedule_id: data.schedule_id,
            title: data.title,
            description: data.description,
            status: data.status,
            done: data.done,
            feedback: data.feedback,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning schedule identifier.
    #[must_use]
    pub const fn schedule_id(&self) -> ScheduleId {
        self.schedule_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the status label.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns the tri-state completion flag.
    #[must_use]
    pub const fn done(&self) -> Option<bool> {
        self.done
    }

    /// Returns the caregiver feedback, if any.
    #[must_use]
    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a patch, touching `updated_at`.
    pub fn apply(&mut self, patch: &TaskPatch, timestamp: DateTime<Utc>) {
        if let Some(status) = &patch.status {
            self.status.clone_from(status);
        }
        if let Some(done) = patch.done {
            self.done = Some(done);
        }
        if let Some(feedback) = &patch.feedback {
            self.feedback = Some(feedback.clone());
        }
        self.updated_at = timestamp;
    }
}

/// Partial update of a task. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    status: Option<String>,
    done: Option<bool>,
    feedback: Option<String>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status label.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the completion flag.
    #[must_use]
    pub const fn with_done(mut self, done: bool) -> Self {
        self.done = Some(done);
        self
    }

    /// Sets the caregiver feedback.
    #[must_use]
    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }

    /// Returns the status label to write, if any.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Returns the completion flag to write, if any.
    #[must_use]
    pub const fn done(&self) -> Option<bool> {
        self.done
    }

    /// Returns the feedback to write, if any.
    #[must_use]
    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    /// Returns whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.done.is_none() && self.feedback.is_none()
    }
}
