//! Infrastructure layer: persistence collaborators for keygate.

pub mod storage;

pub use storage::{InMemoryStorage, PostgresStorage};
