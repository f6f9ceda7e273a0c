//! # Contract Database Handle
//!
//! Opens the SQLite file behind `procura` and hands out repositories.
//!
//! ```text
//!  AppConfig [database]
//!        │  path, max_connections
//!        ▼
//!  DbConfig ──► Database::new ──► migrations::run_migrations
//!                    │
//!                    ├── contracts(Register::Contracts) ──► contracts
//!                    ├── contracts(Register::Goods)     ──► goods
//!                    ├── contractors()                  ──► contractors
//!                    └── settings()                     ──► settings
//! ```
//!
//! The file is opened in WAL mode with foreign keys on. Readers never wait
//! on a running import, and a crash mid-import leaves the last committed
//! state intact.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use procura_core::Register;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::contract::ContractRepository;
use crate::repository::contractor::ContractorRepository;
use crate::repository::settings::SettingsRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Where the contract database lives and how the pool treats it.
///
/// `procura` is a single-user tool, so the pool stays small. The busy
/// timeout matters more than the pool size: an import and a second
/// shell running `procura contract list` can touch the file at once.
///
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/procura.db").max_connections(2);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,
    pub max_connections: u32,
    /// How long a statement waits on a locked file before failing.
    pub busy_timeout: Duration,
    /// How long `Database::new` waits for the first connection.
    pub acquire_timeout: Duration,
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 4,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// Private in-memory database. Each call is a fresh, empty store,
    /// which is what the repository tests rely on.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            // a second connection would open a second, empty database
            max_connections: 1,
            busy_timeout: Duration::from_secs(1),
            acquire_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let base = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
        } else {
            SqliteConnectOptions::from_str(&format!(
                "sqlite://{}",
                self.database_path.display()
            ))
        }
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        Ok(base
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout)
            .create_if_missing(true))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// ## Usage in Commands
/// ```rust,ignore
/// pub async fn show_contract(
///     db: &DbState,
///     register: Register,
///     contract_id: &str,
/// ) -> Result<ContractDto, ApiError> {
///     let contract = db.inner().contracts(register).get_by_contract_id(contract_id).await?;
///     ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool.
    ///
    /// Creates the file when missing and brings the schema up to date
    /// unless `run_migrations` is off.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "opening contract database");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "pool ready");

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending schema migrations. Safe to call repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the contract repository for one register.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let contract = db.contracts(Register::Goods).get_by_contract_id("24G0001").await?;
    /// ```
    pub fn contracts(&self, register: Register) -> ContractRepository {
        ContractRepository::new(self.pool.clone(), register)
    }

    /// Returns the contractor repository.
    pub fn contractors(&self) -> ContractorRepository {
        ContractorRepository::new(self.pool.clone())
    }

    /// Returns the settings repository.
    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections and closes the pool.
    pub async fn close(&self) {
        debug!("closing contract database");
        self.pool.close().await;
    }

    /// `true` when a trivial query round-trips.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
