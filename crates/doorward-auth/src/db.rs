//! SQLite-backed authorization backend.
//!
//! Membership lives in two tables: `members` (people) and `credentials`
//! (their tags and PINs, keyed by guard kind). Every decision — grant or
//! deny — writes one audit row to `access_log`.
//!
//! This backend answers from its local database; replication of the
//! membership data into that database is somebody else's job.

use crate::{Authorizer, Decision, PinChecker};
use doorward_core::{AttemptContext, Credential, DoorId, DoorSide, Error, GuardKind, Result};
use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Database connection configuration for SQLite.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub database_path: String,

    /// Maximum number of connections in the pool.
    pub max_connections: u32,

    /// Whether to create the database file if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to run migrations on connection.
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_path: "doorward.db".to_string(),
            max_connections: 5,
            create_if_missing: true,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration with the given path.
    pub fn new(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Default::default()
        }
    }

    /// Set the maximum number of connections in the pool.
    #[must_use]
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set whether to create the database if it doesn't exist.
    #[must_use]
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Set whether to run migrations automatically.
    #[must_use]
    pub fn auto_migrate(mut self, migrate: bool) -> Self {
        self.auto_migrate = migrate;
        self
    }
}

/// Database connection pool wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection pool with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if the pool cannot be created or migrations
    /// fail.
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        if let Some(parent) = Path::new(&config.database_path).parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::backend(format!("Failed to create database directory: {e}"))
            })?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", config.database_path))
            .map_err(|e| Error::backend(format!("Invalid database path: {e}")))?
            .create_if_missing(config.create_if_missing)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10))
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| Error::backend(format!("Failed to open database: {e}")))?;

        let db = Self { pool };

        if config.auto_migrate {
            db.migrate().await?;
        }

        Ok(db)
    }

    /// Create an in-memory database (primarily for testing).
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if the pool cannot be created or migrations
    /// fail.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| Error::backend(e.to_string()))?
            .foreign_keys(true);

        // In-memory databases must use a single connection; each connection
        // would otherwise see its own empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| Error::backend(e.to_string()))?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Run database migrations, embedded at compile time from the workspace
    /// `migrations/` directory.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if a migration fails to execute.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::backend(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Access the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Authorizer and PIN checker answering from the membership database.
///
/// # Examples
///
/// ```no_run
/// use doorward_auth::{Database, DatabaseConfig, DbAuthorizer};
///
/// # async fn example() -> doorward_core::Result<()> {
/// let db = Database::new(DatabaseConfig::new("doorward.db")).await?;
/// let auth = DbAuthorizer::new(db.pool().clone());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DbAuthorizer {
    pool: SqlitePool,
}

impl DbAuthorizer {
    /// Create an authorizer over an opened membership database.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a member, returning its id. Provisioning helper.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` on database failure.
    pub async fn add_member(&self, name: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO members (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.last_insert_rowid())
    }

    /// Attach a credential of `kind` to a member. Provisioning helper.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` on database failure (including a duplicate
    /// secret for the same kind).
    pub async fn add_credential(
        &self,
        member_id: i64,
        kind: GuardKind,
        secret: &Credential,
    ) -> Result<()> {
        sqlx::query("INSERT INTO credentials (member_id, kind, secret) VALUES (?, ?, ?)")
            .bind(member_id)
            .bind(kind.as_str())
            .bind(secret.as_str())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    /// Look up the active member owning an active credential of `kind`.
    async fn find_member(
        &self,
        kind: GuardKind,
        secret: &Credential,
    ) -> Result<Option<(i64, String)>> {
        sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT m.id, m.name
            FROM members m
            JOIN credentials c ON c.member_id = m.id
            WHERE c.kind = ? AND c.secret = ? AND c.active = 1 AND m.active = 1
            "#,
        )
        .bind(kind.as_str())
        .bind(secret.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)
    }

    /// Record one audit row for a decision.
    async fn record(
        &self,
        door: DoorId,
        side: DoorSide,
        kind: GuardKind,
        credential: &Credential,
        granted: bool,
        message: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO access_log (at, door, side, guard, credential, granted, message)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(chrono::Utc::now())
        .bind(door.as_i32())
        .bind(side.to_string())
        .bind(kind.as_str())
        .bind(credential.as_str())
        .bind(granted)
        .bind(message)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }
}

impl Authorizer for DbAuthorizer {
    async fn allowed(
        &self,
        ctx: &AttemptContext,
        door: DoorId,
        side: DoorSide,
        id: &Credential,
    ) -> Result<Decision> {
        let kind = ctx.guard_kind();
        let member = ctx.run(self.find_member(kind, id)).await??;

        match member {
            Some((_, name)) => {
                let message = format!("Welcome back {name}");
                self.record(door, side, kind, id, true, &message).await?;
                Ok(Decision::allow(message))
            }
            None => {
                // The backend denies without a message; the guard supplies
                // the default wording.
                self.record(door, side, kind, id, false, "").await?;
                Ok(Decision::deny_silent())
            }
        }
    }
}

impl PinChecker for DbAuthorizer {
    async fn check_pin(
        &self,
        ctx: &AttemptContext,
        door: DoorId,
        side: DoorSide,
        pin: &Credential,
    ) -> Result<String> {
        let member = ctx.run(self.find_member(GuardKind::Pin, pin)).await??;

        match member {
            Some((id, name)) => {
                let message = format!("Valid pin for {name} (id={id})");
                self.record(door, side, GuardKind::Pin, pin, true, &message)
                    .await?;
                Ok(message)
            }
            None => {
                self.record(door, side, GuardKind::Pin, pin, false, "Invalid pin")
                    .await?;
                Ok("Invalid pin".to_string())
            }
        }
    }
}

fn backend(err: sqlx::Error) -> Error {
    Error::backend(err.to_string())
}
