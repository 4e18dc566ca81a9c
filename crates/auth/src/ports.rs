//! Storage capabilities consumed by the auth layer.
//!
//! Each trait is a narrow contract over one concern so tests can substitute
//! a double for exactly the collaborator they exercise. A single backend
//! usually implements all three.

use async_trait::async_trait;

use keygate_core::{App, AppId, StorageResult, User, UserId};

/// Persists new users.
#[async_trait]
pub trait UserSaver: Send + Sync {
    /// Store `(email, pass_hash)` and return the assigned id.
    ///
    /// Must fail with `StorageError::UserExists` when the email is taken and
    /// leave no record behind on any failure.
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> StorageResult<UserId>;
}

/// Reads users and their privilege flag.
#[async_trait]
pub trait UserProvider: Send + Sync {
    /// Fetch a user by email; `StorageError::UserNotFound` when absent.
    async fn user(&self, email: &str) -> StorageResult<User>;

    /// Fetch the admin flag; `StorageError::UserNotFound` when absent.
    async fn is_admin(&self, user_id: UserId) -> StorageResult<bool>;
}

/// Resolves applications (tenants).
#[async_trait]
pub trait AppProvider: Send + Sync {
    /// Fetch an application by id; `StorageError::AppNotFound` when absent.
    async fn app(&self, app_id: AppId) -> StorageResult<App>;
}
