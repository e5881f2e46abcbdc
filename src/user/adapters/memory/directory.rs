//! In-memory user directory for tests and local runs.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::user::{
    domain::{User, UserFilters, UserId, UserPage},
    ports::{UserDirectory, UserDirectoryError, UserDirectoryResult},
};

/// Thread-safe in-memory user directory.
///
/// Schedules live in a separate store, so deletion here does not check
/// whether a schedule still names the user.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    state: Arc<RwLock<InMemoryDirectoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryDirectoryState {
    users: HashMap<UserId, User>,
    email_index: HashMap<String, UserId>,
}

impl InMemoryUserDirectory {
    /// Creates an empty in-memory directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> UserDirectoryResult<RwLockReadGuard<'_, InMemoryDirectoryState>> {
        self.state.read().map_err(|err| {
            UserDirectoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_state(&self) -> UserDirectoryResult<RwLockWriteGuard<'_, InMemoryDirectoryState>> {
        self.state.write().map_err(|err| {
            UserDirectoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn collect_sorted<P>(&self, predicate: P) -> UserDirectoryResult<Vec<User>>
    where
        P: Fn(&User) -> bool,
    {
        let state = self.read_state()?;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|user| predicate(user))
            .cloned()
            .collect();
        users.sort_by(by_login);
        Ok(users)
    }
}

fn by_login(left: &User, right: &User) -> Ordering {
    left.user_name()
        .cmp(right.user_name())
        .then_with(|| left.id().into_inner().cmp(&right.id().into_inner()))
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: UserId) -> UserDirectoryResult<Option<User>> {
        let state = self.read_state()?;
        Ok(state.users.get(&id).cloned())
    }

    async fn store(&self, user: &User) -> UserDirectoryResult<()> {
        let mut state = self.write_state()?;
        if state.users.contains_key(&user.id()) {
            return Err(UserDirectoryError::DuplicateUser(user.id()));
        }
        if state.email_index.contains_key(user.email()) {
            return Err(UserDirectoryError::DuplicateEmail(user.email().to_owned()));
        }

        state.email_index.insert(user.email().to_owned(), user.id());
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn list_all(&self) -> UserDirectoryResult<Vec<User>> {
        self.collect_sorted(|_| true)
    }

    async fn update(&self, user: &User) -> UserDirectoryResult<()> {
        let mut state = self.write_state()?;
        let previous_email = state
            .users
            .get(&user.id())
            .map(|stored| stored.email().to_owned())
            .ok_or(UserDirectoryError::NotFound(user.id()))?;
        if let Some(owner) = state.email_index.get(user.email())
            && *owner != user.id()
        {
            return Err(UserDirectoryError::DuplicateEmail(user.email().to_owned()));
        }

        state.email_index.remove(&previous_email);
        state.email_index.insert(user.email().to_owned(), user.id());
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn delete(&self, id: UserId) -> UserDirectoryResult<()> {
        let mut state = self.write_state()?;
        let removed = state
            .users
            .remove(&id)
            .ok_or(UserDirectoryError::NotFound(id))?;
        state.email_index.remove(removed.email());
        Ok(())
    }

    async fn search(&self, filters: &UserFilters) -> UserDirectoryResult<UserPage> {
        let matching = self.collect_sorted(|user| filters.matches(user))?;
        let total = u64::try_from(matching.len()).map_err(UserDirectoryError::persistence)?;
        let offset = usize::try_from(filters.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(filters.page_size()).unwrap_or(usize::MAX);
        let data = matching.into_iter().skip(offset).take(limit).collect();
        Ok(UserPage::new(data, total, filters))
    }
}
