//! Domain model for the user directory.

mod error;
mod ids;
mod patch;
mod query;
mod user;

pub use error::UserDomainError;
pub use ids::UserId;
pub use patch::UserPatch;
pub use query::{UserFilters, UserPage};
pub use user::{PersistedUserData, User, UserAddress};
