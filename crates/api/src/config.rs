//! Process configuration read from environment variables.
//!
//! | Variable                     | Default        |
//! |------------------------------|----------------|
//! | `KEYGATE_ENV`                | `local`        |
//! | `KEYGATE_ADDR`               | `0.0.0.0:8080` |
//! | `KEYGATE_TOKEN_TTL_SECS`     | `3600`         |
//! | `KEYGATE_REQUEST_TIMEOUT_MS` | `5000`         |
//! | `KEYGATE_BCRYPT_COST`        | `10`           |
//! | `DATABASE_URL`               | unset          |
//! | `KEYGATE_APPS`               | unset          |
//!
//! `KEYGATE_APPS` is a comma-separated list of `id:name:secret` entries.

use std::net::SocketAddr;
use std::time::Duration as StdDuration;

use chrono::Duration;
use thiserror::Error;

use keygate_auth::hasher::{DEFAULT_COST, MAX_COST, MIN_COST};
use keygate_core::{App, AppId};
use keygate_observability::Environment;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid value `{value}`")]
    Invalid { var: &'static str, value: String },

    #[error("{var} must be greater than zero")]
    NotPositive { var: &'static str },

    #[error("KEYGATE_BCRYPT_COST {0} outside allowed range {min}..={max}", min = MIN_COST, max = MAX_COST)]
    CostOutOfRange(u32),

    #[error("KEYGATE_APPS entry {0} must look like id:name:secret")]
    MalformedApp(usize),

    #[error("KEYGATE_APPS entry {0} has an empty secret")]
    EmptyAppSecret(usize),

    #[error("KEYGATE_APPS lists app id {0} more than once")]
    DuplicateApp(AppId),
}

#[derive(Clone)]
pub struct Config {
    pub env: Environment,
    pub addr: SocketAddr,
    pub token_ttl: Duration,
    pub request_timeout: StdDuration,
    pub bcrypt_cost: u32,
    pub database_url: Option<String>,
    pub apps: Vec<App>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let env = match get("KEYGATE_ENV") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                var: "KEYGATE_ENV",
                value: v,
            })?,
            None => Environment::default(),
        };

        let addr = match get("KEYGATE_ADDR") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                var: "KEYGATE_ADDR",
                value: v,
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], 8080)),
        };

        let ttl_secs = positive(get("KEYGATE_TOKEN_TTL_SECS"), "KEYGATE_TOKEN_TTL_SECS", 3600)?;
        let timeout_ms = positive(
            get("KEYGATE_REQUEST_TIMEOUT_MS"),
            "KEYGATE_REQUEST_TIMEOUT_MS",
            5000,
        )?;

        let bcrypt_cost = match get("KEYGATE_BCRYPT_COST") {
            Some(v) => v.trim().parse::<u32>().map_err(|_| ConfigError::Invalid {
                var: "KEYGATE_BCRYPT_COST",
                value: v,
            })?,
            None => DEFAULT_COST,
        };
        if !(MIN_COST..=MAX_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::CostOutOfRange(bcrypt_cost));
        }

        let apps = match get("KEYGATE_APPS") {
            Some(v) => parse_apps(&v)?,
            None => Vec::new(),
        };

        Ok(Self {
            env,
            addr,
            token_ttl: Duration::seconds(ttl_secs as i64),
            request_timeout: StdDuration::from_millis(timeout_ms),
            bcrypt_cost,
            database_url: get("DATABASE_URL"),
            apps,
        })
    }
}

// Secrets (app secrets, database credentials) stay out of logs.
impl core::fmt::Debug for Config {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let app_ids: Vec<i32> = self.apps.iter().map(|a| a.id.get()).collect();
        f.debug_struct("Config")
            .field("env", &self.env)
            .field("addr", &self.addr)
            .field("token_ttl_secs", &self.token_ttl.num_seconds())
            .field("request_timeout", &self.request_timeout)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("database", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("apps", &app_ids)
            .finish()
    }
}

fn positive(raw: Option<String>, var: &'static str, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    // Parsed as signed so that "-5" reports NotPositive rather than Invalid.
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| ConfigError::Invalid { var, value: raw.clone() })?;
    if value <= 0 {
        return Err(ConfigError::NotPositive { var });
    }
    Ok(value as u64)
}

fn parse_apps(raw: &str) -> Result<Vec<App>, ConfigError> {
    let mut apps: Vec<App> = Vec::new();
    for (index, entry) in raw.split(',').map(str::trim).filter(|e| !e.is_empty()).enumerate() {
        // The secret may itself contain ':'.
        let mut parts = entry.splitn(3, ':');
        let (Some(id), Some(name), Some(secret)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ConfigError::MalformedApp(index));
        };

        let id = match id.trim().parse::<i32>() {
            Ok(id) if id > 0 => AppId::new(id),
            _ => return Err(ConfigError::MalformedApp(index)),
        };
        if secret.is_empty() {
            return Err(ConfigError::EmptyAppSecret(index));
        }
        if apps.iter().any(|a| a.id == id) {
            return Err(ConfigError::DuplicateApp(id));
        }
        apps.push(App::new(id, name.trim(), secret));
    }
    Ok(apps)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.env, Environment::Local);
        assert_eq!(cfg.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cfg.token_ttl, Duration::seconds(3600));
        assert_eq!(cfg.request_timeout, StdDuration::from_millis(5000));
        assert_eq!(cfg.bcrypt_cost, DEFAULT_COST);
        assert!(cfg.database_url.is_none());
        assert!(cfg.apps.is_empty());
    }

    #[test]
    fn overrides_are_read() {
        let cfg = load(&[
            ("KEYGATE_ENV", "prod"),
            ("KEYGATE_ADDR", "127.0.0.1:9000"),
            ("KEYGATE_TOKEN_TTL_SECS", "60"),
            ("KEYGATE_REQUEST_TIMEOUT_MS", "250"),
            ("KEYGATE_BCRYPT_COST", "4"),
            ("DATABASE_URL", "postgres://u:p@localhost/keygate"),
        ])
        .unwrap();

        assert_eq!(cfg.env, Environment::Prod);
        assert_eq!(cfg.addr.port(), 9000);
        assert_eq!(cfg.token_ttl, Duration::seconds(60));
        assert_eq!(cfg.request_timeout, StdDuration::from_millis(250));
        assert_eq!(cfg.bcrypt_cost, 4);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://u:p@localhost/keygate"));
    }

    #[test]
    fn non_positive_durations_are_rejected() {
        assert_eq!(
            load(&[("KEYGATE_TOKEN_TTL_SECS", "0")]).unwrap_err(),
            ConfigError::NotPositive { var: "KEYGATE_TOKEN_TTL_SECS" }
        );
        assert_eq!(
            load(&[("KEYGATE_REQUEST_TIMEOUT_MS", "-5")]).unwrap_err(),
            ConfigError::NotPositive { var: "KEYGATE_REQUEST_TIMEOUT_MS" }
        );
        assert!(matches!(
            load(&[("KEYGATE_TOKEN_TTL_SECS", "soon")]).unwrap_err(),
            ConfigError::Invalid { var: "KEYGATE_TOKEN_TTL_SECS", .. }
        ));
    }

    #[test]
    fn bcrypt_cost_must_be_in_range() {
        assert_eq!(
            load(&[("KEYGATE_BCRYPT_COST", "3")]).unwrap_err(),
            ConfigError::CostOutOfRange(3)
        );
        assert_eq!(
            load(&[("KEYGATE_BCRYPT_COST", "32")]).unwrap_err(),
            ConfigError::CostOutOfRange(32)
        );
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert!(matches!(
            load(&[("KEYGATE_ENV", "staging")]).unwrap_err(),
            ConfigError::Invalid { var: "KEYGATE_ENV", .. }
        ));
    }

    #[test]
    fn apps_are_parsed_and_secret_may_contain_colons() {
        let cfg = load(&[("KEYGATE_APPS", "1:web:s3cr3t, 2:mobile:a:b:c")]).unwrap();
        assert_eq!(cfg.apps.len(), 2);
        assert_eq!(cfg.apps[0], App::new(AppId::new(1), "web", "s3cr3t"));
        assert_eq!(cfg.apps[1].secret, "a:b:c");
    }

    #[test]
    fn malformed_apps_are_rejected() {
        assert_eq!(
            load(&[("KEYGATE_APPS", "1:web")]).unwrap_err(),
            ConfigError::MalformedApp(0)
        );
        assert_eq!(
            load(&[("KEYGATE_APPS", "1:web:x,zero:y:z")]).unwrap_err(),
            ConfigError::MalformedApp(1)
        );
        assert_eq!(
            load(&[("KEYGATE_APPS", "1:web:")]).unwrap_err(),
            ConfigError::EmptyAppSecret(0)
        );
        assert_eq!(
            load(&[("KEYGATE_APPS", "1:web:x,1:other:y")]).unwrap_err(),
            ConfigError::DuplicateApp(AppId::new(1))
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let cfg = load(&[
            ("DATABASE_URL", "postgres://user:hunter2@db/keygate"),
            ("KEYGATE_APPS", "1:web:topsecret"),
        ])
        .unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("topsecret"));
    }
}
