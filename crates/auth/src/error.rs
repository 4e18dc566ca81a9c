use thiserror::Error;

/// Domain-level outcome of a failed auth operation.
///
/// This is the only error type that leaves [`crate::AuthService`]. The
/// `Internal` detail is for server-side logs; its `Display` stays opaque so
/// transports can render it without leaking backend state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Wrong email/password combination, or no such account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration conflict on email uniqueness.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Unresolvable reference on the admin query path.
    #[error("invalid app id")]
    InvalidApplication,

    /// Storage, hashing or signing failure.
    #[error("internal error")]
    Internal(String),
}

impl AuthError {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::UserAlreadyExists => "user_already_exists",
            Self::InvalidApplication => "invalid_application",
            Self::Internal(_) => "internal",
        }
    }
}
