// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Sentinel

// Database Configuration
pub const SENTINEL_DATABASE_PATH: &str = "SENTINEL_DATABASE_PATH";
pub const SENTINEL_DB_MAX_CONNECTIONS: &str = "SENTINEL_DB_MAX_CONNECTIONS";
pub const SENTINEL_DB_BUSY_TIMEOUT_SECS: &str = "SENTINEL_DB_BUSY_TIMEOUT_SECS";
pub const SENTINEL_DB_ENABLE_WAL: &str = "SENTINEL_DB_ENABLE_WAL";

// Logging
pub const RUST_LOG: &str = "RUST_LOG";
