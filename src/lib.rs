//! Carevisit: caregiver visit scheduling backend.
//!
//! This crate schedules caregiver visits to clients, tracks each visit
//! through check-in and check-out, and records the outcome of the tasks
//! performed during the visit.
//!
//! # Architecture
//!
//! Carevisit follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, memory)
//!
//! # Modules
//!
//! - [`schedule`]: Visit lifecycle state machine, tasks and listings
//! - [`user`]: Directory of clients and caregivers
//! - [`http`]: JSON API over the lifecycle service
//! - [`config`]: Layered service configuration
//! - [`telemetry`]: Log subscriber setup

pub mod config;
pub mod http;
pub mod schedule;
pub mod telemetry;
pub mod user;

#[cfg(test)]
mod test_support;
