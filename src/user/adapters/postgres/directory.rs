//! `PostgreSQL` user directory implementation.

use super::{models::UserRow, schema::users};
use crate::user::{
    domain::{PersistedUserData, User, UserAddress, UserFilters, UserId, UserPage},
    ports::{UserDirectory, UserDirectoryError, UserDirectoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by user adapters.
pub type UserPgPool = Pool<ConnectionManager<PgConnection>>;

const EMAIL_UNIQUE_INDEX: &str = "idx_users_email_unique";

/// `PostgreSQL`-backed user directory.
#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    pool: UserPgPool,
}

impl PostgresUserDirectory {
    /// Creates a new directory from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: UserPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> UserDirectoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> UserDirectoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(UserDirectoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(UserDirectoryError::persistence)?
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_by_id(&self, id: UserId) -> UserDirectoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::id.eq(id.into_inner()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserDirectoryError::persistence)?;
            Ok(row.map(row_to_user))
        })
        .await
    }

    async fn store(&self, user: &User) -> UserDirectoryResult<()> {
        let user_id = user.id();
        let email = user.email().to_owned();
        let row = to_row(user);

        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_write_error(err, user_id, &email))?;
            Ok(())
        })
        .await
    }

    async fn list_all(&self) -> UserDirectoryResult<Vec<User>> {
        self.run_blocking(|connection| {
            let rows = users::table
                .order((users::user_name.asc(), users::id.asc()))
                .select(UserRow::as_select())
                .load::<UserRow>(connection)
                .map_err(UserDirectoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_user).collect())
        })
        .await
    }

    async fn update(&self, user: &User) -> UserDirectoryResult<()> {
        let user_id = user.id();
        let email = user.email().to_owned();
        let row = to_row(user);

        self.run_blocking(move |connection| {
            let affected = diesel::update(users::table.find(user_id.into_inner()))
                .set(&row)
                .execute(connection)
                .map_err(|err| map_write_error(err, user_id, &email))?;
            if affected == 0 {
                return Err(UserDirectoryError::NotFound(user_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: UserId) -> UserDirectoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(users::table.find(id.into_inner()))
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        UserDirectoryError::Referenced(id)
                    }
                    _ => UserDirectoryError::persistence(err),
                })?;
            if affected == 0 {
                return Err(UserDirectoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn search(&self, filters: &UserFilters) -> UserDirectoryResult<UserPage> {
        let owned = filters.clone();

        self.run_blocking(move |connection| {
            let mut count_query = users::table.count().into_boxed();
            let mut query = users::table.select(UserRow::as_select()).into_boxed();
            if let Some(text) = owned.text() {
                let pattern = format!("%{}%", escape_like(text));
                count_query = count_query.filter(
                    users::user_name
                        .ilike(pattern.clone())
                        .or(users::email.ilike(pattern.clone()))
                        .or(users::first_name.ilike(pattern.clone()))
                        .or(users::last_name.ilike(pattern.clone())),
                );
                query = query.filter(
                    users::user_name
                        .ilike(pattern.clone())
                        .or(users::email.ilike(pattern.clone()))
                        .or(users::first_name.ilike(pattern.clone()))
                        .or(users::last_name.ilike(pattern)),
                );
            }
            if let Some(role) = owned.role() {
                count_query = count_query.filter(users::role.eq(role.to_owned()));
                query = query.filter(users::role.eq(role.to_owned()));
            }

            let limit =
                i64::try_from(owned.page_size()).map_err(UserDirectoryError::persistence)?;
            let offset = i64::try_from(owned.offset()).map_err(UserDirectoryError::persistence)?;

            let total_rows = count_query
                .get_result::<i64>(connection)
                .map_err(UserDirectoryError::persistence)?;
            let rows = query
                .order((users::user_name.asc(), users::id.asc()))
                .limit(limit)
                .offset(offset)
                .load::<UserRow>(connection)
                .map_err(UserDirectoryError::persistence)?;
            let total = u64::try_from(total_rows).map_err(UserDirectoryError::persistence)?;
            Ok(UserPage::new(
                rows.into_iter().map(row_to_user).collect(),
                total,
                &owned,
            ))
        })
        .await
    }
}

fn map_write_error(err: DieselError, user_id: UserId, email: &str) -> UserDirectoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_email_unique_violation(info.as_ref()) =>
        {
            UserDirectoryError::DuplicateEmail(email.to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            UserDirectoryError::DuplicateUser(user_id)
        }
        _ => UserDirectoryError::persistence(err),
    }
}

/// Escapes `LIKE` wildcards so search text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        if matches!(character, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped
}

fn to_row(user: &User) -> UserRow {
    let address = user.address();
    UserRow {
        id: user.id().into_inner(),
        user_name: user.user_name().to_owned(),
        email: user.email().to_owned(),
        first_name: user.first_name().to_owned(),
        last_name: user.last_name().to_owned(),
        role: user.role().to_owned(),
        active: user.is_active(),
        profile_picture: user.profile_picture().map(str::to_owned),
        location_house_number: address.house_number.clone(),
        location_street: address.street.clone(),
        location_city: address.city.clone(),
        location_state: address.state.clone(),
        location_pincode: address.pincode.clone(),
        location_lat: address.lat,
        location_long: address.long,
        created_at: user.created_at(),
        updated_at: user.updated_at(),
    }
}

fn row_to_user(row: UserRow) -> User {
    User::from_persisted(PersistedUserData {
        id: UserId::from_uuid(row.id),
        user_name: row.user_name,
        email: row.email,
        first_name: row.first_name,
        last_name: row.last_name,
        role: row.role,
        active: row.active,
        profile_picture: row.profile_picture,
        address: UserAddress {
            house_number: row.location_house_number,
            street: row.location_street,
            city: row.location_city,
            state: row.location_state,
            pincode: row.location_pincode,
            lat: row.location_lat,
            long: row.location_long,
        },
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn is_email_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == EMAIL_UNIQUE_INDEX)
}
