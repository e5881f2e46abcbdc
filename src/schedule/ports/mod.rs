//! Port contracts for visit scheduling.
//!
//! Ports define infrastructure-agnostic interfaces used by the lifecycle
//! service.

pub mod repository;

pub use repository::{ScheduleRepository, ScheduleRepositoryError, ScheduleRepositoryResult};
