//! `PostgreSQL` adapters for the user directory.

mod directory;
mod models;
mod schema;

pub use directory::{PostgresUserDirectory, UserPgPool};
