//! In-memory schedule adapters.

mod repository;

pub use repository::InMemoryScheduleRepository;
