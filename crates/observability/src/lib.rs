//! Tracing/logging setup shared by keygate binaries.

/// Tracing configuration (filters, output format per environment).
pub mod tracing;

pub use crate::tracing::{Environment, ParseEnvironmentError};

/// Initialize process-wide logging for `env`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(env: Environment) {
    tracing::init(env);
}
