//! `keygate-core`: domain primitives shared by every keygate crate.
//!
//! This crate contains **pure domain** types (no I/O, no hashing, no signing).

pub mod error;
pub mod id;
pub mod model;

pub use error::{StorageError, StorageResult};
pub use id::{AppId, UserId};
pub use model::{App, User};
