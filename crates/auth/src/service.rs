//! Auth orchestrator: the only callable surface of this crate.
//!
//! The service holds no per-call state. Every operation is an independent
//! sequence of storage, hashing and signing steps; failures are classified
//! through [`crate::classify`] before they are returned.

use std::sync::Arc;

use chrono::Duration;
use tracing::{info, instrument};

use keygate_core::{AppId, UserId};

use crate::clock::{Clock, SystemClock};
use crate::hasher::CredentialHasher;
use crate::ports::{AppProvider, UserProvider, UserSaver};
use crate::{AuthError, classify, token};

/// Registers users, verifies credentials, issues tokens and answers admin
/// queries.
///
/// Cheap to clone; all collaborators are shared read-only handles.
#[derive(Clone)]
pub struct AuthService {
    user_saver: Arc<dyn UserSaver>,
    user_provider: Arc<dyn UserProvider>,
    app_provider: Arc<dyn AppProvider>,
    hasher: Arc<dyn CredentialHasher>,
    clock: Arc<dyn Clock>,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        user_saver: Arc<dyn UserSaver>,
        user_provider: Arc<dyn UserProvider>,
        app_provider: Arc<dyn AppProvider>,
        hasher: Arc<dyn CredentialHasher>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            user_saver,
            user_provider,
            app_provider,
            hasher,
            clock: Arc::new(SystemClock),
            token_ttl,
        }
    }

    /// Replace the wall clock used for token expiry.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Register a new user and return the id assigned by storage.
    ///
    /// No format validation happens here; callers validate input shape.
    #[instrument(name = "auth.register", skip_all, fields(email = %email))]
    pub async fn register(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        info!("registering new user");

        let pass_hash = self.hash_password(password).await?;

        let user_id = self
            .user_saver
            .save_user(email, &pass_hash)
            .await
            .map_err(classify::save_user)?;

        info!(user_id = %user_id, "user registered");
        Ok(user_id)
    }

    /// Verify credentials and issue a token scoped to `app_id`.
    ///
    /// Credentials are fully verified before the application is resolved, so
    /// probing with unknown application ids reveals nothing about accounts.
    #[instrument(name = "auth.login", skip_all, fields(email = %email, app_id = %app_id))]
    pub async fn login(&self, email: &str, password: &str, app_id: AppId) -> Result<String, AuthError> {
        info!("logging in");

        let user = self
            .user_provider
            .user(email)
            .await
            .map_err(classify::user_lookup)?;

        if !self.verify_password(password, &user.password_hash).await? {
            return Err(classify::mismatch());
        }

        let app = self
            .app_provider
            .app(app_id)
            .await
            .map_err(classify::app_lookup)?;

        info!(user_id = %user.id, "user logged in");

        token::issue(&user, &app, self.token_ttl, self.clock.now()).map_err(classify::signing)
    }

    /// Whether `user_id` carries the admin flag.
    #[instrument(name = "auth.is_admin", skip_all, fields(user_id = %user_id))]
    pub async fn is_admin(&self, user_id: UserId) -> Result<bool, AuthError> {
        info!("checking if user is admin");

        let is_admin = self
            .user_provider
            .is_admin(user_id)
            .await
            .map_err(classify::admin_lookup)?;

        info!(is_admin, "admin flag resolved");
        Ok(is_admin)
    }

    // bcrypt is CPU-bound; keep it off the async workers.
    async fn hash_password(&self, password: &str) -> Result<Vec<u8>, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(classify::blocking_task)?
            .map_err(classify::hashing)
    }

    async fn verify_password(&self, password: &str, hash: &[u8]) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        let hash = hash.to_vec();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(classify::blocking_task)?
            .map_err(classify::verification)
    }
}
