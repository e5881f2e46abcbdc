//! Application services for visit lifecycle orchestration.

mod error;
mod lifecycle;
mod queries;
mod requests;

pub use error::{ErrorKind, ScheduleLifecycleError, ScheduleLifecycleResult, UserRole};
pub use lifecycle::ScheduleLifecycleService;
pub use queries::{ScheduleWithClient, SchedulesWithClients};
pub use requests::{
    CreateScheduleRequest, EndScheduleRequest, TaskOutcome, TaskUpdateFailure,
    UpdateScheduleRequest, VisitCompletion,
};
