//! Diesel schema for schedule persistence.

diesel::table! {
    /// Scheduled caregiver visits.
    schedules (id) {
        /// Schedule identifier.
        id -> Uuid,
        /// Client receiving care.
        client_user_id -> Uuid,
        /// Caregiver performing the visit.
        assigned_user_id -> Uuid,
        /// Service label.
        #[max_length = 255]
        service_name -> Varchar,
        /// Planned slot start.
        scheduled_slot_from -> Timestamptz,
        /// Planned slot end.
        scheduled_slot_to -> Timestamptz,
        /// Lifecycle status label.
        #[max_length = 20]
        visit_status -> Varchar,
        /// Check-in instant.
        check_in_time -> Nullable<Timestamptz>,
        /// Check-in latitude.
        check_in_lat -> Nullable<Float8>,
        /// Check-in longitude.
        check_in_long -> Nullable<Float8>,
        /// Check-out instant.
        check_out_time -> Nullable<Timestamptz>,
        /// Check-out latitude.
        check_out_lat -> Nullable<Float8>,
        /// Check-out longitude.
        check_out_long -> Nullable<Float8>,
        /// Caregiver note recorded at completion.
        service_note -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks belonging to a schedule, ordered by position.
    schedule_tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning schedule.
        schedule_id -> Uuid,
        /// Zero-based order within the schedule.
        position -> Int4,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Task description.
        description -> Text,
        /// Free-form status label.
        #[max_length = 50]
        status -> Varchar,
        /// Tri-state completion flag.
        done -> Nullable<Bool>,
        /// Caregiver feedback.
        feedback -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(schedule_tasks -> schedules (schedule_id));
diesel::allow_tables_to_appear_in_same_query!(schedules, schedule_tasks);
