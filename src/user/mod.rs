//! User directory for visit scheduling.
//!
//! Schedules reference two users, the client receiving care and the
//! caregiver assigned to the visit. This module owns those users, the lookup
//! contract the schedule engine consults before any mutation that names a
//! user, and the management service that registers and maintains them. It
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Application services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
