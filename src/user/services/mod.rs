//! Application services for user management.

mod error;
mod management;

pub use error::{UserManagementError, UserManagementResult};
pub use management::{NewUserRequest, UserManagementService};
