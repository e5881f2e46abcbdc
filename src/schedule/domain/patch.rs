//! Typed partial update for schedules.

use super::{ScheduledSlot, VisitStamp, VisitStatus};
use crate::user::domain::UserId;

/// Validated partial update of a schedule.
///
/// Patches are produced by the schedule domain and the lifecycle service
/// after every rule has been checked; repositories apply them as-is. Absent
/// fields are left untouched. The slot is always carried whole so stores
/// never persist an unvalidated bound.
///
/// A patch produced by a status transition carries the status it was
/// validated against. Stores refuse the write when the stored status no
/// longer matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulePatch {
    expected_status: Option<VisitStatus>,
    client_user_id: Option<UserId>,
    assigned_user_id: Option<UserId>,
    service_name: Option<String>,
    scheduled_slot: Option<ScheduledSlot>,
    visit_status: Option<VisitStatus>,
    check_in: Option<VisitStamp>,
    check_out: Option<VisitStamp>,
    service_note: Option<String>,
}

impl SchedulePatch {
    /// Makes the write conditional on the stored status being `status`.
    #[must_use]
    pub const fn expecting(mut self, status: VisitStatus) -> Self {
        self.expected_status = Some(status);
        self
    }

    pub(crate) const fn client_user(mut self, id: UserId) -> Self {
        self.client_user_id = Some(id);
        self
    }

    pub(crate) const fn assigned_user(mut self, id: UserId) -> Self {
        self.assigned_user_id = Some(id);
        self
    }

    pub(crate) fn service_name(mut self, name: String) -> Self {
        self.service_name = Some(name);
        self
    }

    pub(crate) const fn slot(mut self, slot: ScheduledSlot) -> Self {
        self.scheduled_slot = Some(slot);
        self
    }

    pub(crate) const fn status(mut self, status: VisitStatus) -> Self {
        self.visit_status = Some(status);
        self
    }

    pub(crate) const fn checked_in(mut self, stamp: VisitStamp) -> Self {
        self.check_in = Some(stamp);
        self
    }

    pub(crate) const fn checked_out(mut self, stamp: VisitStamp) -> Self {
        self.check_out = Some(stamp);
        self
    }

    pub(crate) fn note(mut self, note: String) -> Self {
        self.service_note = Some(note);
        self
    }

    /// Returns the status the stored schedule must hold for the write to
    /// apply, if the patch is conditional.
    #[must_use]
    pub const fn expected_status(&self) -> Option<VisitStatus> {
        self.expected_status
    }

    /// Returns the new client, if changed.
    #[must_use]
    pub const fn client_user_id(&self) -> Option<UserId> {
        self.client_user_id
    }

    /// Returns the new assignee, if changed.
    #[must_use]
    pub const fn assigned_user_id(&self) -> Option<UserId> {
        self.assigned_user_id
    }

    /// Returns the new service name, if changed.
    #[must_use]
    pub fn service_name_value(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    /// Returns the new slot, if changed.
    #[must_use]
    pub const fn scheduled_slot(&self) -> Option<ScheduledSlot> {
        self.scheduled_slot
    }

    /// Returns the new visit status, if changed.
    #[must_use]
    pub const fn visit_status(&self) -> Option<VisitStatus> {
        self.visit_status
    }

    /// Returns the check-in stamp to record, if any.
    #[must_use]
    pub const fn check_in(&self) -> Option<VisitStamp> {
        self.check_in
    }

    /// Returns the check-out stamp to record, if any.
    #[must_use]
    pub const fn check_out(&self) -> Option<VisitStamp> {
        self.check_out
    }

    /// Returns the service note to record, if any.
    #[must_use]
    pub fn service_note(&self) -> Option<&str> {
        self.service_note.as_deref()
    }

    /// Returns whether the patch changes nothing.
    ///
    /// The expected status is a precondition, not a change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.client_user_id.is_none()
            && self.assigned_user_id.is_none()
            && self.service_name.is_none()
            && self.scheduled_slot.is_none()
            && self.visit_status.is_none()
            && self.check_in.is_none()
            && self.check_out.is_none()
            && self.service_note.is_none()
    }
}
