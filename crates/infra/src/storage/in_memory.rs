use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use keygate_auth::{AppProvider, UserProvider, UserSaver};
use keygate_core::{App, AppId, StorageError, StorageResult, User, UserId};

#[derive(Debug)]
struct UserRow {
    user: User,
    is_admin: bool,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<UserRow>,
    by_email: HashMap<String, usize>,
    apps: HashMap<AppId, App>,
}

/// In-memory user directory and application registry.
///
/// Intended for tests/dev. User ids are assigned sequentially from 1 and
/// email uniqueness is checked under the same write lock as the insert, so
/// concurrent registrations of one email yield exactly one user.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    tables: RwLock<Tables>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an application.
    pub fn provision_app(&self, app: App) -> StorageResult<()> {
        let mut tables = self.write()?;
        tables.apps.insert(app.id, app);
        Ok(())
    }

    /// Set the admin flag on an existing user.
    pub fn set_admin(&self, user_id: UserId, is_admin: bool) -> StorageResult<()> {
        let mut tables = self.write()?;
        let row = tables
            .users
            .iter_mut()
            .find(|r| r.user.id == user_id)
            .ok_or(StorageError::UserNotFound)?;
        row.is_admin = is_admin;
        Ok(())
    }

    fn read(&self) -> StorageResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StorageError::backend("lock poisoned"))
    }

    fn write(&self) -> StorageResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StorageError::backend("lock poisoned"))
    }
}

#[async_trait]
impl UserSaver for InMemoryStorage {
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> StorageResult<UserId> {
        let mut tables = self.write()?;
        if tables.by_email.contains_key(email) {
            return Err(StorageError::UserExists);
        }

        let index = tables.users.len();
        let id = i64::try_from(index + 1)
            .map(UserId::new)
            .map_err(|_| StorageError::backend("user id space exhausted"))?;

        tables.users.push(UserRow {
            user: User {
                id,
                email: email.to_string(),
                password_hash: pass_hash.to_vec(),
            },
            is_admin: false,
        });
        tables.by_email.insert(email.to_string(), index);

        Ok(id)
    }
}

#[async_trait]
impl UserProvider for InMemoryStorage {
    async fn user(&self, email: &str) -> StorageResult<User> {
        let tables = self.read()?;
        tables
            .by_email
            .get(email)
            .and_then(|&i| tables.users.get(i))
            .map(|row| row.user.clone())
            .ok_or(StorageError::UserNotFound)
    }

    async fn is_admin(&self, user_id: UserId) -> StorageResult<bool> {
        let tables = self.read()?;
        tables
            .users
            .iter()
            .find(|r| r.user.id == user_id)
            .map(|r| r.is_admin)
            .ok_or(StorageError::UserNotFound)
    }
}

#[async_trait]
impl AppProvider for InMemoryStorage {
    async fn app(&self, app_id: AppId) -> StorageResult<App> {
        let tables = self.read()?;
        tables
            .apps
            .get(&app_id)
            .cloned()
            .ok_or(StorageError::AppNotFound)
    }
}
