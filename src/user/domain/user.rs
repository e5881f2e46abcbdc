//! Directory user record.

use super::{UserDomainError, UserId, UserPatch};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Postal address and coordinates of a user's home.
///
/// Caregivers use the client's address to navigate to a visit, so the
/// coordinates are carried alongside the postal fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAddress {
    /// House or flat number.
    pub house_number: String,
    /// Street name.
    pub street: String,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Postal code.
    pub pincode: String,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub long: f64,
}

/// A user as seen by the scheduling core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    user_name: String,
    email: String,
    first_name: String,
    last_name: String,
    role: String,
    active: bool,
    profile_picture: Option<String>,
    address: UserAddress,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedUserData {
    /// Persisted identifier.
    pub id: UserId,
    /// Persisted login name.
    pub user_name: String,
    /// Persisted email address.
    pub email: String,
    /// Persisted given name.
    pub first_name: String,
    /// Persisted family name.
    pub last_name: String,
    /// Persisted role label.
    pub role: String,
    /// Whether the account is active.
    pub active: bool,
    /// Persisted profile picture URL, if any.
    pub profile_picture: Option<String>,
    /// Persisted home address.
    pub address: UserAddress,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new active user.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::EmptyUserName`] when the user name is blank
    /// or [`UserDomainError::InvalidEmail`] when the email has no local part
    /// or domain.
    pub fn new(
        user_name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, UserDomainError> {
        let raw_name: String = user_name.into();
        let name = normalize_user_name(&raw_name)?;
        let normalized_email = normalize_email(email.into())?;
        let timestamp = clock.utc();

        Ok(Self {
            id: UserId::new(),
            user_name: name,
            email: normalized_email,
            first_name: String::new(),
            last_name: String::new(),
            role: role.into(),
            active: true,
            profile_picture: None,
            address: UserAddress::default(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Sets the given and family names.
    #[must_use]
    pub fn with_names(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// Sets the home address.
    #[must_use]
    pub fn with_address(mut self, address: UserAddress) -> Self {
        self.address = address;
        self
    }

    /// Sets the profile picture URL.
    #[must_use]
    pub fn with_profile_picture(mut self, url: impl Into<String>) -> Self {
        self.profile_picture = Some(url.into());
        self
    }

    /// Applies `patch`, touching `updated_at`.
    ///
    /// The user is left unchanged when validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::EmptyUserName`] or
    /// [`UserDomainError::InvalidEmail`] for the same inputs [`User::new`]
    /// rejects.
    pub fn apply(
        &mut self,
        patch: &UserPatch,
        timestamp: DateTime<Utc>,
    ) -> Result<(), UserDomainError> {
        let user_name = patch
            .user_name
            .as_deref()
            .map(normalize_user_name)
            .transpose()?;
        let email = patch.email.clone().map(normalize_email).transpose()?;

        if let Some(name) = user_name {
            self.user_name = name;
        }
        if let Some(normalized) = email {
            self.email = normalized;
        }
        if let Some(first_name) = &patch.first_name {
            first_name.clone_into(&mut self.first_name);
        }
        if let Some(last_name) = &patch.last_name {
            last_name.clone_into(&mut self.last_name);
        }
        if let Some(role) = &patch.role {
            role.clone_into(&mut self.role);
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        if let Some(url) = &patch.profile_picture {
            self.profile_picture = Some(url.clone());
        }
        if let Some(address) = &patch.address {
            self.address = address.clone();
        }
        self.updated_at = timestamp;
        Ok(())
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            user_name: data.user_name,
            email: data.email,
            first_name: data.first_name,
            last_name: data.last_name,
            role: data.role,
            active: data.active,
            profile_picture: data.profile_picture,
            address: data.address,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the login name.
    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the given name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Returns the family name.
    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Returns the role label.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Returns whether the account is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the profile picture URL, if any.
    #[must_use]
    pub fn profile_picture(&self) -> Option<&str> {
        self.profile_picture.as_deref()
    }

    /// Returns the home address.
    #[must_use]
    pub const fn address(&self) -> &UserAddress {
        &self.address
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn normalize_user_name(raw: &str) -> Result<String, UserDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UserDomainError::EmptyUserName);
    }
    Ok(trimmed.to_owned())
}

fn normalize_email(raw: String) -> Result<String, UserDomainError> {
    let trimmed = raw.trim();
    let is_valid = trimmed
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty() && !domain.contains('@'));
    if !is_valid {
        return Err(UserDomainError::InvalidEmail(raw));
    }
    Ok(trimmed.to_ascii_lowercase())
}
