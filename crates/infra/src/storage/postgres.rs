//! Postgres-backed user directory and application registry.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StorageError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StorageError | Scenario |
//! |------------|----------------------|--------------|----------|
//! | Database (unique violation) | `23505` | `UserExists` | Email already registered |
//! | Database (other) | Any other | `Backend` | Constraint or query failure |
//! | PoolClosed | N/A | `Backend` | Connection pool was closed |
//! | Other | N/A | `Backend` | Network errors, decoding, etc. |
//!
//! Absent rows are detected with `fetch_optional` and reported as the
//! not-found signal matching the lookup.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{FromRow, Row};
use tracing::{debug, instrument};

use keygate_auth::{AppProvider, UserProvider, UserSaver};
use keygate_core::{App, AppId, StorageError, StorageResult, User, UserId};

const UNIQUE_VIOLATION: &str = "23505";

const SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id         BIGSERIAL PRIMARY KEY,
        email      TEXT    NOT NULL UNIQUE,
        pass_hash  BYTEA   NOT NULL,
        is_admin   BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS apps (
        id      INTEGER PRIMARY KEY,
        name    TEXT NOT NULL,
        secret  TEXT NOT NULL
    )
    "#,
];

/// Postgres storage for users and applications.
///
/// `Send + Sync`; the pool handles connection sharing across concurrent calls.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `users` and `apps` tables if they are missing.
    pub async fn migrate(&self) -> StorageResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        debug!("schema ensured");
        Ok(())
    }

    /// Insert or update an application.
    #[instrument(skip_all, fields(app_id = %app.id), err)]
    pub async fn provision_app(&self, app: &App) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO apps (id, name, secret)
            VALUES ($1, $2, $3)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                secret = EXCLUDED.secret
            "#,
        )
        .bind(app.id.get())
        .bind(&app.name)
        .bind(&app.secret)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("provision_app", e))?;
        Ok(())
    }
}

#[async_trait]
impl UserSaver for PostgresStorage {
    #[instrument(skip_all, fields(email = %email))]
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> StorageResult<UserId> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (email, pass_hash)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(email)
        .bind(pass_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_user", e))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("save_user", e))?;
        Ok(UserId::new(id))
    }
}

#[async_trait]
impl UserProvider for PostgresStorage {
    #[instrument(skip_all, fields(email = %email))]
    async fn user(&self, email: &str) -> StorageResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, pass_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("user", e))?;

        row.map(Into::into).ok_or(StorageError::UserNotFound)
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn is_admin(&self, user_id: UserId) -> StorageResult<bool> {
        let row = sqlx::query("SELECT is_admin FROM users WHERE id = $1")
            .bind(user_id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("is_admin", e))?;

        match row {
            Some(row) => row
                .try_get::<bool, _>("is_admin")
                .map_err(|e| map_sqlx_error("is_admin", e)),
            None => Err(StorageError::UserNotFound),
        }
    }
}

#[async_trait]
impl AppProvider for PostgresStorage {
    #[instrument(skip(self), fields(app_id = %app_id))]
    async fn app(&self, app_id: AppId) -> StorageResult<App> {
        let row = sqlx::query_as::<_, AppRow>("SELECT id, name, secret FROM apps WHERE id = $1")
            .bind(app_id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("app", e))?;

        row.map(Into::into).ok_or(StorageError::AppNotFound)
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code();
            classify_db_code(operation, code.as_deref(), db_err.message())
        }
        sqlx::Error::PoolClosed => {
            StorageError::backend(format!("connection pool closed in {operation}"))
        }
        other => StorageError::backend(format!("sqlx error in {operation}: {other}")),
    }
}

fn classify_db_code(operation: &str, code: Option<&str>, message: &str) -> StorageError {
    match code {
        Some(UNIQUE_VIOLATION) if operation == "save_user" => StorageError::UserExists,
        _ => StorageError::backend(format!("database error in {operation}: {message}")),
    }
}

// SQLx row types

#[derive(Debug)]
struct UserRow {
    id: i64,
    email: String,
    pass_hash: Vec<u8>,
}

impl<'r> FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            pass_hash: row.try_get("pass_hash")?,
        })
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::new(row.id),
            email: row.email,
            password_hash: row.pass_hash,
        }
    }
}

#[derive(Debug)]
struct AppRow {
    id: i32,
    name: String,
    secret: String,
}

impl<'r> FromRow<'r, PgRow> for AppRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(AppRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            secret: row.try_get("secret")?,
        })
    }
}

impl From<AppRow> for App {
    fn from(row: AppRow) -> Self {
        App::new(AppId::new(row.id), row.name, row.secret)
    }
}
