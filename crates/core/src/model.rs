//! Directory records: users and applications.

use serde::{Deserialize, Serialize};

use crate::{AppId, UserId};

/// A registered user.
///
/// `password_hash` is opaque: it is only ever checked through a credential
/// hasher's verify operation, never compared by equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: Vec<u8>,
}

/// A calling application (tenant) with its own token-signing secret.
///
/// Provisioned out-of-band; read-only to the auth layer.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    pub id: AppId,
    pub name: String,
    pub secret: String,
}

impl App {
    pub fn new(id: AppId, name: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            secret: secret.into(),
        }
    }
}

impl core::fmt::Debug for App {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("App")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}
