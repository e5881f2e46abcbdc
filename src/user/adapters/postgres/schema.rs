//! Diesel schema for the user directory.

diesel::table! {
    /// Directory users referenced by schedules.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Unique login name.
        #[max_length = 255]
        user_name -> Varchar,
        /// Unique, lower-cased email address.
        #[max_length = 255]
        email -> Varchar,
        /// Given name.
        #[max_length = 255]
        first_name -> Varchar,
        /// Family name.
        #[max_length = 255]
        last_name -> Varchar,
        /// Role label.
        #[max_length = 50]
        role -> Varchar,
        /// Whether the account is active.
        active -> Bool,
        /// Optional profile picture URL.
        profile_picture -> Nullable<Text>,
        /// Home house number.
        #[max_length = 50]
        location_house_number -> Varchar,
        /// Home street.
        #[max_length = 255]
        location_street -> Varchar,
        /// Home city.
        #[max_length = 255]
        location_city -> Varchar,
        /// Home state.
        #[max_length = 255]
        location_state -> Varchar,
        /// Home postal code.
        #[max_length = 20]
        location_pincode -> Varchar,
        /// Home latitude.
        location_lat -> Float8,
        /// Home longitude.
        location_long -> Float8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
