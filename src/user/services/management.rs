//! User management: create, read, update, delete and search.

use super::{UserManagementError, UserManagementResult};
use crate::user::{
    domain::{User, UserAddress, UserFilters, UserId, UserPage, UserPatch},
    ports::UserDirectory,
};
use mockable::Clock;
use std::sync::Arc;

/// Request payload for registering a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUserRequest {
    user_name: String,
    email: String,
    role: String,
    first_name: String,
    last_name: String,
    profile_picture: Option<String>,
    address: UserAddress,
}

impl NewUserRequest {
    /// Creates a request with the mandatory fields.
    #[must_use]
    pub fn new(
        user_name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            email: email.into(),
            role: role.into(),
            first_name: String::new(),
            last_name: String::new(),
            profile_picture: None,
            address: UserAddress::default(),
        }
    }

    /// Sets the given and family names.
    #[must_use]
    pub fn with_names(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// Sets the profile picture URL.
    #[must_use]
    pub fn with_profile_picture(mut self, url: impl Into<String>) -> Self {
        self.profile_picture = Some(url.into());
        self
    }

    /// Sets the home address.
    #[must_use]
    pub fn with_address(mut self, address: UserAddress) -> Self {
        self.address = address;
        self
    }
}

/// User management service over a [`UserDirectory`].
#[derive(Clone)]
pub struct UserManagementService<U, C>
where
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    users: Arc<U>,
    clock: Arc<C>,
}

impl<U, C> UserManagementService<U, C>
where
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new user management service.
    #[must_use]
    pub const fn new(users: Arc<U>, clock: Arc<C>) -> Self {
        Self { users, clock }
    }

    /// Registers an active user with a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UserManagementError::Domain`] for a blank name or malformed
    /// email, or [`UserManagementError::Directory`] when the email is taken
    /// or persistence fails.
    pub async fn create_user(&self, request: NewUserRequest) -> UserManagementResult<User> {
        let base = User::new(request.user_name, request.email, request.role, &*self.clock)?
            .with_names(request.first_name, request.last_name)
            .with_address(request.address);
        let user = match request.profile_picture {
            Some(url) => base.with_profile_picture(url),
            None => base,
        };
        self.users.store(&user).await?;
        tracing::info!(user_id = %user.id(), role = user.role(), "user created");
        Ok(user)
    }

    /// Returns every user ordered by login name.
    ///
    /// # Errors
    ///
    /// Returns [`UserManagementError::Directory`] when the lookup fails.
    pub async fn list_users(&self) -> UserManagementResult<Vec<User>> {
        Ok(self.users.list_all().await?)
    }

    /// Returns one user.
    ///
    /// # Errors
    ///
    /// Returns [`UserManagementError::NotFound`] when the user does not
    /// exist.
    pub async fn get_user(&self, id: UserId) -> UserManagementResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(UserManagementError::NotFound(id))
    }

    /// Applies a partial update to a user.
    ///
    /// An empty patch returns the stored user unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`UserManagementError::NotFound`] when the user does not
    /// exist, [`UserManagementError::Domain`] for invalid values, or
    /// [`UserManagementError::Directory`] when the new email is taken.
    pub async fn update_user(&self, id: UserId, patch: &UserPatch) -> UserManagementResult<User> {
        let mut user = self.get_user(id).await?;
        if patch.is_empty() {
            return Ok(user);
        }
        user.apply(patch, self.clock.utc())?;
        self.users.update(&user).await?;
        tracing::info!(user_id = %id, "user updated");
        Ok(user)
    }

    /// Removes a user.
    ///
    /// # Errors
    ///
    /// Returns [`UserManagementError::Directory`] when the user does not
    /// exist, is still named by schedules, or persistence fails.
    pub async fn delete_user(&self, id: UserId) -> UserManagementResult<()> {
        self.users.delete(id).await?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Returns one page of users matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns [`UserManagementError::Directory`] when the lookup fails.
    pub async fn search_users(&self, filters: &UserFilters) -> UserManagementResult<UserPage> {
        Ok(self.users.search(filters).await?)
    }
}
