//! Diesel row models for user persistence.

use super::schema::users;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row model shared by reads, inserts and full updates of user records.
///
/// As a changeset the primary key is skipped.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// User identifier.
    pub id: uuid::Uuid,
    /// Login name.
    pub user_name: String,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Role label.
    pub role: String,
    /// Active flag.
    pub active: bool,
    /// Profile picture URL.
    pub profile_picture: Option<String>,
    /// Home house number.
    pub location_house_number: String,
    /// Home street.
    pub location_street: String,
    /// Home city.
    pub location_city: String,
    /// Home state.
    pub location_state: String,
    /// Home postal code.
    pub location_pincode: String,
    /// Home latitude.
    pub location_lat: f64,
    /// Home longitude.
    pub location_long: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
