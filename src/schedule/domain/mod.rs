//! Domain model for visit scheduling.
//!
//! The schedule domain validates every lifecycle change and expresses the
//! accepted change as a typed patch. Persistence applies patches; it never
//! decides whether a change is legal.

mod error;
mod ids;
mod patch;
mod query;
mod schedule;
mod slot;
mod status;
mod task;

pub use error::{ParseSortError, ParseVisitStatusError, ScheduleDomainError};
pub use ids::{ScheduleId, TaskId};
pub use patch::SchedulePatch;
pub use query::{DateRange, ScheduleFilters, SchedulePage, ScheduleSortField, SortDirection};
pub use schedule::{NewScheduleData, PersistedScheduleData, Schedule};
pub use slot::{DayWindow, Location, ScheduledSlot, VisitStamp};
pub use status::VisitStatus;
pub use task::{NewTask, PersistedTaskData, Task, TaskPatch};
