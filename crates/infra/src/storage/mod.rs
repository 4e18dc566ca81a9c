//! Persistence collaborators for the auth capabilities.
//!
//! Both backends implement `UserSaver`, `UserProvider` and `AppProvider`
//! from `keygate-auth`, reporting failures with the `StorageError` signals.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStorage;
pub use postgres::PostgresStorage;
