//! # Database Pool Management
//!
//! SQLite connection pool and the handles built on it.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  KhataConfig::load(..)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  config.db_config() ─── DbConfig (path, pool sizes, quota)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ─── pool + migrations                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────┐                                       │
//! │  │ SqlitePool                   │                                       │
//! │  │  Conn1  Conn2  ...           │  (max_connections)                    │
//! │  └──────────────┬───────────────┘                                       │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  db.store() ──► CollectionStore ──► db.collection::<Order>(..)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! Readers don't block the single writer, so dashboards can page through one
//! collection while another is being saved.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use khata_core::{KeyNamespace, Record, Strictness};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::Collection;
use crate::storage::SqliteStorage;
use crate::store::CollectionStore;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/khata.db")
///     .max_connections(5)
///     .quota_bytes(Some(5 * 1024 * 1024));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Default: 5
    pub max_connections: u32,

    /// Default: 1
    pub min_connections: u32,

    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect. Default: true
    pub run_migrations: bool,

    /// Byte limit for everything in `kv_store`. Default: none
    pub quota_bytes: Option<usize>,
}

impl DbConfig {
    /// Creates a configuration for the file at `path`, created on connect if
    /// it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
            quota_bytes: None,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn quota_bytes(mut self, quota: Option<usize>) -> Self {
        self.quota_bytes = quota;
        self
    }

    /// Creates an isolated in-memory database configuration (for testing).
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
            quota_bytes: None,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Database handle: the pool plus the collection store on top of it.
///
/// Cloning is cheap; clones share the pool and the per-collection locks.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    store: CollectionStore,
}

impl Database {
    /// Opens the pool and runs migrations (if enabled).
    ///
    /// SQLite is configured with WAL journaling, NORMAL synchronous and
    /// foreign keys on.
    ///
    /// ## Errors
    /// - [`DbError::ConnectionFailed`] if the file cannot be opened
    /// - [`DbError::MigrationFailed`] if a migration fails
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        // sqlite://path?mode=rwc creates the file if missing
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            quota_bytes = ?config.quota_bytes,
            "Database pool created"
        );

        let storage = SqliteStorage::new(pool.clone()).with_quota(config.quota_bytes);
        let db = Database {
            pool,
            store: CollectionStore::new(Arc::new(storage)),
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// The raw pool, for diagnostics.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The collection store backed by this database.
    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    /// Repository for `T`'s collection.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let orders = db.collection::<Order>(&config.namespace()?, config.strictness());
    /// let page = orders.page(&query, 10).await?;
    /// ```
    pub fn collection<T: Record>(
        &self,
        namespace: &KeyNamespace,
        strictness: Strictness,
    ) -> Collection<T> {
        Collection::new(self.store.clone(), namespace, strictness)
    }

    /// Closes the pool. Later operations fail with a connection error.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Returns true if the database answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use khata_core::records::{EntryType, FinancialRecord};
    use khata_core::PaymentMethod;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        db.close().await;
        assert!(!db.health_check().await);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .quota_bytes(Some(1024));

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.quota_bytes, Some(1024));
    }

    #[tokio::test]
    async fn test_collections_persist_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("khata.db");
        let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();

        {
            let db = Database::new(DbConfig::new(&path)).await.unwrap();
            let ledger = db.collection::<FinancialRecord>(&KeyNamespace::default(), Strictness::Strict);
            ledger
                .create(|id| {
                    FinancialRecord::new(
                        id,
                        EntryType::Expense,
                        "Rent",
                        "April rent",
                        25_000.0,
                        PaymentMethod::BankTransfer,
                        date,
                    )
                })
                .await
                .unwrap();
            db.close().await;
        }

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let ledger = db.collection::<FinancialRecord>(&KeyNamespace::default(), Strictness::Strict);
        let records = ledger.all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "FIN-001");
        assert_eq!(ledger.key().to_string(), "khata_financial_v1");
    }
}
