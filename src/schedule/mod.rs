//! Visit scheduling for caregivers.
//!
//! A schedule is one planned caregiver visit with its checklist of tasks.
//! This module owns the visit lifecycle state machine (`upcoming` →
//! `in_progress` → `completed`, with `cancelled` as a side branch), the
//! check-in and check-out rules, the single-occupancy rule for caregivers and
//! the best-effort task updates applied when a visit ends. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
