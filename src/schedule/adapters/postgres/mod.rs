//! `PostgreSQL` adapters for schedule persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresScheduleRepository, SchedulePgPool};
