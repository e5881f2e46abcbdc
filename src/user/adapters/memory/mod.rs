//! In-memory user directory adapter.

mod directory;

pub use directory::InMemoryUserDirectory;
