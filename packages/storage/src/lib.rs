// ABOUTME: Data layer and persistence for Sentinel
// ABOUTME: SQLite pool construction, embedded migrations, error taxonomy and retry policy

pub mod error;
pub mod retry;
pub mod rows;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sentinel_config::DatabaseSettings;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

pub use error::{SqlxResultExt, StorageError, StorageResult};
pub use retry::{with_retry, INITIAL_BACKOFF_MS, MAX_RETRIES};
pub use rows::{read_json, read_optional_timestamp, read_timestamp};

/// Where the database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    /// Private in-memory database; forces a single pooled connection
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub location: DatabaseLocation,
    pub enable_wal: bool,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::from_settings(&DatabaseSettings::default())
    }
}

impl StorageConfig {
    pub fn from_settings(settings: &DatabaseSettings) -> Self {
        Self {
            location: DatabaseLocation::File(settings.path.clone()),
            enable_wal: settings.enable_wal,
            max_connections: settings.max_connections,
            busy_timeout_seconds: settings.busy_timeout_seconds,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DatabaseLocation::File(path.into()),
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: DatabaseLocation::Memory,
            enable_wal: false,
            max_connections: 1,
            ..Self::default()
        }
    }
}

/// Open a connection pool with foreign keys enforced on every connection
pub async fn connect(config: &StorageConfig) -> StorageResult<SqlitePool> {
    let busy_timeout = Duration::from_secs(config.busy_timeout_seconds);

    let (options, max_connections) = match &config.location {
        DatabaseLocation::File(path) => {
            // Ensure parent directory exists
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let journal_mode = if config.enable_wal {
                SqliteJournalMode::Wal
            } else {
                SqliteJournalMode::Delete
            };

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(journal_mode);

            debug!("Connecting to database: {}", path.display());
            (options, config.max_connections.max(1))
        }
        DatabaseLocation::Memory => {
            let options = SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StorageError::from_sqlx("parsing database url", e))?;
            (options, 1)
        }
    };

    let options = options
        .foreign_keys(true)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(busy_timeout);

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(busy_timeout);

    if config.location == DatabaseLocation::Memory {
        // The database lives only as long as its single connection
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .context("opening database")?;

    info!("Database connection established");
    Ok(pool)
}

/// Apply the embedded schema migrations
pub async fn migrate(pool: &SqlitePool) -> StorageResult<()> {
    info!("Running database migrations");

    sqlx::migrate!("./migrations").run(pool).await?;

    debug!("Database migrations completed");
    Ok(())
}

/// Connect and migrate in one step
pub async fn open(config: &StorageConfig) -> StorageResult<SqlitePool> {
    let pool = connect(config).await?;
    migrate(&pool).await?;
    Ok(pool)
}
