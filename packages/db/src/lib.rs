// ABOUTME: Database connection management and storage initialization
// ABOUTME: Provides shared access to the SQLite pool and every storage layer

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::debug;

use sentinel_config::DatabaseSettings;
use sentinel_projects::ProjectStorage;
use sentinel_reviews::ReviewStorage;
use sentinel_storage::{open, StorageConfig, StorageResult};
use sentinel_tools::ToolStorage;

/// Shared database state
#[derive(Clone)]
pub struct DbState {
    pub pool: SqlitePool,
    pub project_storage: Arc<ProjectStorage>,
    pub tool_storage: Arc<ToolStorage>,
    pub review_storage: Arc<ReviewStorage>,
}

impl DbState {
    /// Create new database state from an already migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            project_storage: Arc::new(ProjectStorage::new(pool.clone())),
            tool_storage: Arc::new(ToolStorage::new(pool.clone())),
            review_storage: Arc::new(ReviewStorage::new(pool.clone())),
            pool,
        }
    }

    /// Initialize database state with default configuration
    pub async fn init() -> StorageResult<Self> {
        Self::init_with_path(None).await
    }

    /// Initialize database state with an optional custom database path
    pub async fn init_with_path(database_path: Option<PathBuf>) -> StorageResult<Self> {
        let mut settings = DatabaseSettings::default();
        if let Some(path) = database_path {
            settings.path = path;
        }
        Self::init_with_settings(&settings).await
    }

    /// Initialize database state from `SENTINEL_*` environment variables
    pub async fn init_from_env() -> StorageResult<Self> {
        let settings = DatabaseSettings::from_env()?;
        Self::init_with_settings(&settings).await
    }

    pub async fn init_with_settings(settings: &DatabaseSettings) -> StorageResult<Self> {
        debug!("Opening database at {}", settings.path.display());
        Self::init_with_config(&StorageConfig::from_settings(settings)).await
    }

    /// Open, migrate and wrap a database described by `config`
    pub async fn init_with_config(config: &StorageConfig) -> StorageResult<Self> {
        let pool = open(config).await?;
        Ok(Self::new(pool))
    }
}
