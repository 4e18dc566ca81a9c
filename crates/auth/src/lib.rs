//! `keygate-auth`: authentication decision logic.
//!
//! This crate is intentionally decoupled from HTTP and storage: persistence is
//! reached only through the capability traits in [`ports`].

pub mod classify;
pub mod clock;
pub mod error;
pub mod hasher;
pub mod ports;
pub mod service;
pub mod token;

pub use clock::{Clock, SystemClock};
pub use error::AuthError;
pub use hasher::{BcryptHasher, CredentialHasher, HashError};
pub use ports::{AppProvider, UserProvider, UserSaver};
pub use service::AuthService;
pub use token::{TokenClaims, TokenError};
