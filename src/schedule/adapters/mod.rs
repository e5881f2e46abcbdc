//! Adapter implementations for schedule ports.

pub mod memory;
pub mod postgres;
