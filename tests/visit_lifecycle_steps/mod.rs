//! Step definitions for visit lifecycle behaviour tests.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
