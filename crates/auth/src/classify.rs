//! Mapping of collaborator failures onto [`AuthError`].
//!
//! Every call site in the service maps through exactly one function here,
//! so each failure is classified (and logged) in one place. Raw storage or
//! crypto errors never leave this module.

use core::fmt::Display;

use keygate_core::StorageError;
use tracing::{error, warn};

use crate::{AuthError, HashError, TokenError};

/// `SaveUser` failed during registration.
pub fn save_user(err: StorageError) -> AuthError {
    match err {
        StorageError::UserExists => {
            warn!("user already exists");
            AuthError::UserAlreadyExists
        }
        other => internal("failed to save user", other),
    }
}

/// `UserByEmail` failed during login.
///
/// A missing account is reported exactly like a wrong password.
pub fn user_lookup(err: StorageError) -> AuthError {
    match err {
        StorageError::UserNotFound => {
            warn!("user not found");
            AuthError::InvalidCredentials
        }
        other => internal("failed to get user", other),
    }
}

/// The stored hash did not match the supplied password.
pub fn mismatch() -> AuthError {
    warn!("invalid credentials");
    AuthError::InvalidCredentials
}

/// `AppById` failed during login. Unknown applications are a backend
/// condition at this layer, not an authorization failure.
pub fn app_lookup(err: StorageError) -> AuthError {
    internal("failed to resolve app", err)
}

/// `AdminFlag` failed.
pub fn admin_lookup(err: StorageError) -> AuthError {
    match err {
        e if e.is_not_found() => {
            warn!(error = %e, "user not found");
            AuthError::InvalidApplication
        }
        other => internal("failed to get admin flag", other),
    }
}

pub fn hashing(err: HashError) -> AuthError {
    internal("failed to hash password", err)
}

pub fn verification(err: HashError) -> AuthError {
    internal("failed to verify password", err)
}

pub fn signing(err: TokenError) -> AuthError {
    internal("failed to create token", err)
}

/// The blocking hash task panicked or was cancelled.
pub fn blocking_task(err: tokio::task::JoinError) -> AuthError {
    internal("password task did not complete", err)
}

fn internal(context: &str, err: impl Display) -> AuthError {
    error!(error = %err, "{context}");
    AuthError::internal(format!("{context}: {err}"))
}
