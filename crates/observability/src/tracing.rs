//! Tracing/logging initialization.
//!
//! `local` prints human-readable lines for a terminal; `dev` and `prod` emit
//! JSON. `RUST_LOG` always overrides the environment's default level.

use core::str::FromStr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Deployment environment, selecting the log format and default level.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Local,
    Dev,
    Prod,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }

    /// Filter directive used when `RUST_LOG` is unset.
    pub fn default_directive(self) -> &'static str {
        match self {
            Environment::Local | Environment::Dev => "debug",
            Environment::Prod => "info",
        }
    }
}

impl core::fmt::Display for Environment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown environment '{0}' (expected local, dev or prod)")]
pub struct ParseEnvironmentError(String);

impl FromStr for Environment {
    type Err = ParseEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(ParseEnvironmentError(s.to_string())),
        }
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(env: Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(env.default_directive()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    let _ = match env {
        Environment::Local => builder.pretty().try_init(),
        Environment::Dev | Environment::Prod => builder.json().with_target(false).try_init(),
    };
}
