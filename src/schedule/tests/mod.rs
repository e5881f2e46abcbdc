//! Unit tests for visit scheduling.

mod domain_tests;
mod support;
