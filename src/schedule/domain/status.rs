//! Visit lifecycle status.

use super::ParseVisitStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a scheduled visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    /// The visit is planned and has not been checked into.
    Upcoming,
    /// The caregiver has checked in.
    InProgress,
    /// The caregiver has checked out.
    Completed,
    /// The visit was called off before it started.
    Cancelled,
}

impl VisitStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether no further status change is permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns whether the lifecycle graph has an edge from `self` to
    /// `target`.
    ///
    /// Staying in the same status is not a transition and returns `false`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Upcoming, Self::InProgress | Self::Cancelled)
                | (Self::InProgress, Self::Completed)
        )
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for VisitStatus {
    type Error = ParseVisitStatusError;

    /// Parses a canonical label; case and surrounding whitespace must match.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "upcoming" => Ok(Self::Upcoming),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseVisitStatusError(value.to_owned())),
        }
    }
}
