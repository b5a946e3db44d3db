use std::env;
use std::path::PathBuf;

/// File name of the SQLite database inside the Sentinel directory
pub const DATABASE_FILE_NAME: &str = "sentinel.db";

/// Get the path to the Sentinel directory (~/.sentinel)
pub fn sentinel_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".sentinel")
    } else {
        dirs::home_dir()
            .unwrap_or_else(env::temp_dir)
            .join(".sentinel")
    }
}

/// Get the default database path (~/.sentinel/sentinel.db)
pub fn database_file() -> PathBuf {
    sentinel_dir().join(DATABASE_FILE_NAME)
}
