use std::sync::Arc;

use keygate_auth::{AuthService, BcryptHasher};
use keygate_infra::{InMemoryStorage, PostgresStorage};

use crate::config::Config;

const PG_MAX_CONNECTIONS: u32 = 10;

/// Shared state handed to every handler through an `Extension`.
#[derive(Clone)]
pub struct AppServices {
    auth: AuthService,
}

impl AppServices {
    pub fn new(auth: AuthService) -> Self {
        Self { auth }
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }
}

/// Wire the storage backend, hasher and auth service from configuration.
///
/// `DATABASE_URL` selects Postgres; without it the process runs on an
/// in-memory directory that does not survive restarts.
pub async fn build_services(config: &Config) -> anyhow::Result<AppServices> {
    let hasher = Arc::new(BcryptHasher::new(config.bcrypt_cost)?);

    let auth = match &config.database_url {
        Some(url) => {
            let storage = PostgresStorage::connect(url, PG_MAX_CONNECTIONS).await?;
            storage.migrate().await?;
            for app in &config.apps {
                storage.provision_app(app).await?;
            }
            tracing::info!(apps = config.apps.len(), "using postgres storage");

            let storage = Arc::new(storage);
            AuthService::new(
                storage.clone(),
                storage.clone(),
                storage,
                hasher,
                config.token_ttl,
            )
        }
        None => {
            let storage = InMemoryStorage::new();
            for app in &config.apps {
                storage.provision_app(app.clone())?;
            }
            if config.apps.is_empty() {
                tracing::warn!("no applications provisioned; every login will fail");
            }
            tracing::warn!("DATABASE_URL not set; using in-memory storage");

            let storage = Arc::new(storage);
            AuthService::new(
                storage.clone(),
                storage.clone(),
                storage,
                hasher,
                config.token_ttl,
            )
        }
    };

    Ok(AppServices::new(auth))
}
